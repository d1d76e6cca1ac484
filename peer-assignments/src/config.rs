use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AssignError, AssignResult};
use crate::schedule::seed::WeekScope;
use crate::schedule::slot_utils::TimeConvention;
use crate::schedule::types::{Day, MatchLevel};

/// Which side of the pairing is drawn at random
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Every free observer slot gets a class to visit
    #[default]
    ClassForObserver,
    /// Every slot with free peers gets a class and a peer sent to it
    PeerForClass,
}

/// Granularity of a run or of subject tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunScope {
    #[default]
    Week,
    Day,
}

/// Settings for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub mode: MatchMode,
    /// Week: one seed and one pass in table order. Day: one seed per day, days ascending.
    pub run_scope: RunScope,
    /// How long a chosen subject stays excluded from the strict level
    pub subject_scope: RunScope,
    pub subject_uniqueness: bool,
    pub observer_rotation: bool,
    /// Last fallback level to try, 1 to 4
    pub max_level: u8,
    pub max_alternatives: usize,
    pub time_convention: TimeConvention,
    /// ISO week such as "2026-W42"; the current week when absent
    pub week: Option<String>,
    /// Days to generate in a per-day run; every day with free slots when empty
    pub days: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            mode: MatchMode::ClassForObserver,
            run_scope: RunScope::Week,
            subject_scope: RunScope::Week,
            subject_uniqueness: true,
            observer_rotation: true,
            max_level: 4,
            max_alternatives: 3,
            time_convention: TimeConvention::Clock24,
            week: None,
            days: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Loads a JSON config file; missing keys keep their defaults.
    ///
    /// The result is not validated, since command-line overrides may still
    /// complete it. Call [`GeneratorConfig::validate`] once they are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> AssignResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            AssignError::Configuration(format!("cannot read config {}: {}", path.display(), e))
        })?;
        let config: GeneratorConfig = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), "loaded generator config");
        Ok(config)
    }

    pub fn validate(&self) -> AssignResult<()> {
        if MatchLevel::from_number(self.max_level).is_none() {
            return Err(AssignError::Configuration(format!(
                "max_level must be between 1 and 4, got {}",
                self.max_level
            )));
        }
        if !self.days.is_empty() && self.run_scope != RunScope::Day {
            return Err(AssignError::Configuration(
                "selecting days requires the per-day run scope".to_string(),
            ));
        }
        if self.subject_scope == RunScope::Day && self.run_scope == RunScope::Week {
            return Err(AssignError::Configuration(
                "per-day subject tracking requires the per-day run scope".to_string(),
            ));
        }
        self.selected_days()?;
        if let Some(week) = &self.week {
            week.parse::<WeekScope>()?;
        }
        Ok(())
    }

    pub fn max_level(&self) -> MatchLevel {
        MatchLevel::from_number(self.max_level).unwrap_or(MatchLevel::AnySlot)
    }

    /// The configured week, or the current one
    pub fn week_scope(&self) -> AssignResult<WeekScope> {
        match &self.week {
            Some(week) => week.parse(),
            None => Ok(WeekScope::current()),
        }
    }

    /// Parsed, sorted and deduplicated day filter
    pub fn selected_days(&self) -> AssignResult<Vec<Day>> {
        let mut days = self
            .days
            .iter()
            .map(|d| d.parse::<Day>())
            .collect::<Result<Vec<_>, _>>()?;
        days.sort();
        days.dedup();
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_level(), MatchLevel::AnySlot);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{ "mode": "peer-for-class", "time_convention": "meridiem", "week": "2026-W42" }"#,
        )
        .unwrap();
        assert_eq!(config.mode, MatchMode::PeerForClass);
        assert_eq!(config.time_convention, TimeConvention::Meridiem);
        assert_eq!(config.max_alternatives, 3);
        assert!(config.subject_uniqueness);
        assert_eq!(config.week_scope().unwrap(), WeekScope::new(2026, 42).unwrap());
    }

    #[test]
    fn test_rejects_out_of_range_level() {
        let config = GeneratorConfig {
            max_level: 0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(config.validate(), Err(AssignError::Configuration(_))));
    }

    #[test]
    fn test_day_filter_requires_day_scope() {
        let config = GeneratorConfig {
            days: vec!["Monday".to_string()],
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GeneratorConfig {
            run_scope: RunScope::Day,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_selected_days_sorted_and_checked() {
        let config = GeneratorConfig {
            run_scope: RunScope::Day,
            days: vec!["fri".to_string(), "Monday".to_string(), "friday".to_string()],
            ..GeneratorConfig::default()
        };
        assert_eq!(config.selected_days().unwrap(), vec![Day::Monday, Day::Friday]);

        let config = GeneratorConfig {
            days: vec!["Someday".to_string()],
            ..config
        };
        assert!(matches!(config.validate(), Err(AssignError::InvalidDay(_))));
    }

    #[test]
    fn test_loaded_file_is_completed_by_overrides() {
        let file_name = format!("peer-assign-config-{}.json", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        fs::write(&path, r#"{ "days": ["Monday", "Wednesday"] }"#).unwrap();

        let mut config = GeneratorConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(config.validate().is_err());

        config.run_scope = RunScope::Day;
        assert!(config.validate().is_ok());
        assert_eq!(config.selected_days().unwrap(), vec![Day::Monday, Day::Wednesday]);
    }

    #[test]
    fn test_unreadable_config_is_configuration_error() {
        let err = GeneratorConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, AssignError::Configuration(_)));
    }
}
