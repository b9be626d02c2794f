use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::GameError;
use crate::models::role::RoleId;
use crate::models::settings::Settings;

/// Build the role deck for one game: the configured wolf count, one of each
/// enabled optional role, padded to player count with Villager.
pub fn build_deck(settings: &Settings, player_count: usize) -> Result<Vec<RoleId>, GameError> {
    let mut deck: Vec<RoleId> = Vec::with_capacity(player_count);
    deck.extend(std::iter::repeat(RoleId::Werewolf).take(settings.wolf_count.max(1)));
    deck.extend(settings.enabled_optional_roles());

    if deck.len() > player_count {
        return Err(GameError::NotEnoughPlayers {
            needed: deck.len(),
            have: player_count,
        });
    }
    deck.resize(player_count, RoleId::Villager);
    Ok(deck)
}

/// Unbiased shuffle through an injected source so assignment is reproducible
/// under test.
pub fn shuffle_deck(deck: &mut [RoleId], rng: &mut impl Rng) {
    deck.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn deck_is_padded_with_villagers() {
        let mut settings = Settings::default();
        settings.wolf_count = 2;
        settings.active_roles.insert(RoleId::Seer, true);

        let deck = build_deck(&settings, 7).unwrap();
        assert_eq!(deck.len(), 7);
        assert_eq!(deck.iter().filter(|r| **r == RoleId::Werewolf).count(), 2);
        assert_eq!(deck.iter().filter(|r| **r == RoleId::Seer).count(), 1);
        assert_eq!(deck.iter().filter(|r| **r == RoleId::Villager).count(), 4);
    }

    #[test]
    fn deck_larger_than_table_is_rejected() {
        let mut settings = Settings::default();
        settings.wolf_count = 3;
        settings.active_roles.insert(RoleId::Seer, true);

        let err = build_deck(&settings, 3).unwrap_err();
        assert_eq!(
            err,
            GameError::NotEnoughPlayers { needed: 4, have: 3 }
        );
    }

    #[test]
    fn same_seed_same_shuffle() {
        let settings = Settings::default();
        let mut a = build_deck(&settings, 8).unwrap();
        let mut b = a.clone();
        shuffle_deck(&mut a, &mut StdRng::seed_from_u64(42));
        shuffle_deck(&mut b, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
