// Phase codes of the disassembly line and the groups they report under.
use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Production phases, declared in name order so tables sort alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Cutting,
    Deboning,
    Packaging,
    ServiceSlaughtering,
    Slaughtering,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Cutting,
        Phase::Deboning,
        Phase::Packaging,
        Phase::ServiceSlaughtering,
        Phase::Slaughtering,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Phase::Cutting => "PC01",
            Phase::Deboning => "PD01",
            Phase::Packaging => "PP01",
            Phase::ServiceSlaughtering => "PX01",
            Phase::Slaughtering => "PS01",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Cutting => "Cutting",
            Phase::Deboning => "Deboning",
            Phase::Packaging => "Packaging",
            Phase::ServiceSlaughtering => "Service Slaughtering",
            Phase::Slaughtering => "Slaughtering",
        }
    }
}

static PHASE_CODES: Lazy<HashMap<&'static str, Phase>> =
    Lazy::new(|| Phase::ALL.iter().map(|p| (p.code(), *p)).collect());

/// Look up the phase for a `DISASSEMBLY_FAZE` code. Unknown codes yield `None`.
pub fn classify_phase(code: &str) -> Option<Phase> {
    PHASE_CODES.get(code.trim()).copied()
}

/// Label a row is grouped under. `Unknown` collects unrecognized codes and
/// sorts after every named phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhaseGroup {
    Named(Phase),
    Unknown,
}

impl PhaseGroup {
    pub fn name(&self) -> &'static str {
        match self {
            PhaseGroup::Named(p) => p.name(),
            PhaseGroup::Unknown => "Unknown",
        }
    }
}

impl From<Phase> for PhaseGroup {
    fn from(phase: Phase) -> Self {
        PhaseGroup::Named(phase)
    }
}

impl fmt::Display for PhaseGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for PhaseGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// What to do with rows whose phase code is not in the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnknownPhasePolicy {
    /// Report them under an `Unknown` phase.
    #[default]
    Group,
    /// Leave them out of every table.
    Drop,
}

impl UnknownPhasePolicy {
    pub fn group(&self, code: &str) -> Option<PhaseGroup> {
        match (classify_phase(code), self) {
            (Some(phase), _) => Some(PhaseGroup::Named(phase)),
            (None, UnknownPhasePolicy::Group) => Some(PhaseGroup::Unknown),
            (None, UnknownPhasePolicy::Drop) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_known_code() {
        assert_eq!(classify_phase("PC01"), Some(Phase::Cutting));
        assert_eq!(classify_phase("PS01"), Some(Phase::Slaughtering));
        assert_eq!(classify_phase("PD01"), Some(Phase::Deboning));
        assert_eq!(classify_phase("PP01"), Some(Phase::Packaging));
        assert_eq!(classify_phase("PX01"), Some(Phase::ServiceSlaughtering));
        assert_eq!(classify_phase(" PC01 "), Some(Phase::Cutting));
    }

    #[test]
    fn unknown_codes_are_not_errors() {
        assert_eq!(classify_phase("PZ99"), None);
        assert_eq!(classify_phase(""), None);
        assert_eq!(classify_phase("pc01"), None);
    }

    #[test]
    fn unknown_sorts_after_named_phases() {
        let mut groups = vec![
            PhaseGroup::Unknown,
            PhaseGroup::Named(Phase::Slaughtering),
            PhaseGroup::Named(Phase::Cutting),
            PhaseGroup::Named(Phase::ServiceSlaughtering),
        ];
        groups.sort();
        let names: Vec<_> = groups.iter().map(|g| g.name()).collect();
        assert_eq!(
            names,
            vec!["Cutting", "Service Slaughtering", "Slaughtering", "Unknown"]
        );
    }

    #[test]
    fn policy_decides_unknown_rows() {
        assert_eq!(
            UnknownPhasePolicy::Group.group("XX"),
            Some(PhaseGroup::Unknown)
        );
        assert_eq!(UnknownPhasePolicy::Drop.group("XX"), None);
        assert_eq!(
            UnknownPhasePolicy::Drop.group("PP01"),
            Some(PhaseGroup::Named(Phase::Packaging))
        );
    }

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&PhaseGroup::Named(Phase::ServiceSlaughtering)).unwrap();
        assert_eq!(json, "\"Service Slaughtering\"");
    }
}
