use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

/// Placeholder written when a pick has no alternatives
pub const NO_ALTERNATIVES: &str = "None";

/// A seeded pick plus the names offered as alternatives
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a, T> {
    pub chosen: &'a T,
    pub alternatives: Vec<String>,
}

/// Uniform random pick with a short shuffled list of alternatives
#[derive(Debug, Clone, Copy)]
pub struct SelectionPolicy {
    max_alternatives: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy { max_alternatives: 3 }
    }
}

impl SelectionPolicy {
    pub fn new(max_alternatives: usize) -> Self {
        SelectionPolicy { max_alternatives }
    }

    /// Picks one entry uniformly, consuming a single draw
    pub fn pick<'a, T, R: Rng>(&self, pool: &[&'a T], rng: &mut R) -> Option<&'a T> {
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.gen_range(0..pool.len())])
    }

    /// Picks one entry of `pool` and builds alternatives from `offer`.
    ///
    /// Exactly one draw is consumed for the pick, then `offer` minus every
    /// entry sharing the chosen identity is deduplicated by name, shuffled and
    /// truncated. Returns None for an empty pool without touching `rng`.
    pub fn select<'a, T, R, I, N>(
        &self,
        pool: &[&'a T],
        offer: &[&'a T],
        identity: I,
        name: N,
        rng: &mut R,
    ) -> Option<Selection<'a, T>>
    where
        R: Rng,
        I: Fn(&T) -> &str,
        N: Fn(&T) -> &str,
    {
        let chosen = self.pick(pool, rng)?;
        let chosen_id = identity(chosen);

        let mut seen = HashSet::new();
        let mut alternatives: Vec<String> = offer
            .iter()
            .filter(|entry| identity(entry) != chosen_id)
            .map(|entry| name(entry))
            .filter(|n| seen.insert(*n))
            .map(str::to_string)
            .collect();

        alternatives.shuffle(rng);
        alternatives.truncate(self.max_alternatives);

        Some(Selection { chosen, alternatives })
    }
}

/// Renders alternatives as a ", " separated list, or "None"
pub fn render_alternatives(alternatives: &[String]) -> String {
    if alternatives.is_empty() {
        NO_ALTERNATIVES.to_string()
    } else {
        alternatives.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug, PartialEq)]
    struct Person {
        id: String,
        name: String,
    }

    fn person(id: &str, name: &str) -> Person {
        Person {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn pick<'a>(pool: &[&'a Person], seed: u64) -> Selection<'a, Person> {
        let mut rng = StdRng::seed_from_u64(seed);
        SelectionPolicy::default()
            .select(pool, pool, |p| p.id.as_str(), |p| p.name.as_str(), &mut rng)
            .unwrap()
    }

    #[test]
    fn test_empty_pool_selects_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool: Vec<&Person> = Vec::new();
        let selection = SelectionPolicy::default().select(
            &pool,
            &pool,
            |p| p.id.as_str(),
            |p| p.name.as_str(),
            &mut rng,
        );
        assert!(selection.is_none());
    }

    #[test]
    fn test_alternatives_exclude_chosen_identity() {
        let people = vec![
            person("1", "Asha"),
            person("1", "Asha (lab)"),
            person("2", "Ben"),
            person("3", "Chen"),
        ];
        let pool: Vec<&Person> = people.iter().collect();

        for seed in 0..32 {
            let selection = pick(&pool, seed);
            let chosen_names: Vec<&str> = people
                .iter()
                .filter(|p| p.id == selection.chosen.id)
                .map(|p| p.name.as_str())
                .collect();
            assert!(selection.alternatives.iter().all(|a| !chosen_names.contains(&a.as_str())));
            assert!(selection.alternatives.len() <= 3);
        }
    }

    #[test]
    fn test_alternatives_are_capped_and_deduplicated() {
        let people = vec![
            person("1", "Asha"),
            person("2", "Ben"),
            person("3", "Chen"),
            person("4", "Dara"),
            person("5", "Eli"),
            person("6", "Ben"),
        ];
        let pool: Vec<&Person> = people.iter().collect();

        for seed in 0..32 {
            let selection = pick(&pool, seed);
            assert_eq!(selection.alternatives.len(), 3);
            let unique: HashSet<&String> = selection.alternatives.iter().collect();
            assert_eq!(unique.len(), selection.alternatives.len());
        }
    }

    #[test]
    fn test_same_seed_same_selection() {
        let people: Vec<Person> =
            (0..10).map(|i| person(&i.to_string(), &format!("P{}", i))).collect();
        let pool: Vec<&Person> = people.iter().collect();
        assert_eq!(pick(&pool, 42), pick(&pool, 42));
    }

    #[test]
    fn test_single_candidate_has_no_alternatives() {
        let people = vec![person("1", "Asha")];
        let pool: Vec<&Person> = people.iter().collect();
        let selection = pick(&pool, 3);
        assert_eq!(selection.chosen.name, "Asha");
        assert!(selection.alternatives.is_empty());
        assert_eq!(render_alternatives(&selection.alternatives), "None");
    }

    #[test]
    fn test_render_alternatives_joins_names() {
        let alternatives = vec!["Ben".to_string(), "Chen".to_string()];
        assert_eq!(render_alternatives(&alternatives), "Ben, Chen");
    }
}
