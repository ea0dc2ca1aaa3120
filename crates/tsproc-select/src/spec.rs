//! Selection specifications
//!
//! [`SelectionKind`] is the fixed string enum written as the `TSList`
//! parameter; [`SelectionSpec`] carries the kind together with the pattern,
//! group, positions or identifiers it needs.

use std::fmt;
use std::str::FromStr;

use crate::error::{SelectError, SelectResult};
use crate::pattern::Pattern;
use crate::position::PositionList;

/// Kind of time series list, as written in command text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionKind {
    AllTs,
    AllMatchingTsid,
    FirstMatchingTsid,
    LastMatchingTsid,
    SelectedTs,
    EnsembleId,
    TsPosition,
    SpecifiedTsid,
}

impl SelectionKind {
    /// All kinds, in the order they are offered to users
    pub const ALL: [SelectionKind; 8] = [
        SelectionKind::AllTs,
        SelectionKind::AllMatchingTsid,
        SelectionKind::FirstMatchingTsid,
        SelectionKind::LastMatchingTsid,
        SelectionKind::SelectedTs,
        SelectionKind::EnsembleId,
        SelectionKind::TsPosition,
        SelectionKind::SpecifiedTsid,
    ];

    /// Canonical text form
    pub fn name(&self) -> &'static str {
        match self {
            SelectionKind::AllTs => "AllTS",
            SelectionKind::AllMatchingTsid => "AllMatchingTSID",
            SelectionKind::FirstMatchingTsid => "FirstMatchingTSID",
            SelectionKind::LastMatchingTsid => "LastMatchingTSID",
            SelectionKind::SelectedTs => "SelectedTS",
            SelectionKind::EnsembleId => "EnsembleID",
            SelectionKind::TsPosition => "TSPosition",
            SelectionKind::SpecifiedTsid => "SpecifiedTSID",
        }
    }
}

impl FromStr for SelectionKind {
    type Err = SelectError;

    /// Parse a kind name, ignoring ASCII case
    fn from_str(s: &str) -> SelectResult<Self> {
        let s = s.trim();
        SelectionKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SelectError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which subset of the result table a command operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSpec {
    AllEntries,
    AllMatching(Pattern),
    FirstMatching(Pattern),
    LastMatching(Pattern),
    Selected,
    EnsembleMembers(String),
    Positions(PositionList),
    /// Literal identifiers or aliases, resolved in the order given
    Explicit(Vec<String>),
}

impl SelectionSpec {
    /// Shorthand for `AllMatchingTSID`
    pub fn all_matching(pattern: &str) -> Self {
        SelectionSpec::AllMatching(Pattern::new(pattern))
    }

    /// The kind of this specification
    pub fn kind(&self) -> SelectionKind {
        match self {
            SelectionSpec::AllEntries => SelectionKind::AllTs,
            SelectionSpec::AllMatching(_) => SelectionKind::AllMatchingTsid,
            SelectionSpec::FirstMatching(_) => SelectionKind::FirstMatchingTsid,
            SelectionSpec::LastMatching(_) => SelectionKind::LastMatchingTsid,
            SelectionSpec::Selected => SelectionKind::SelectedTs,
            SelectionSpec::EnsembleMembers(_) => SelectionKind::EnsembleId,
            SelectionSpec::Positions(_) => SelectionKind::TsPosition,
            SelectionSpec::Explicit(_) => SelectionKind::SpecifiedTsid,
        }
    }

    /// Build a specification from the conventional command parameters
    ///
    /// `tsid` feeds the matching kinds, `ensemble_id` feeds `EnsembleID`,
    /// `position` feeds `TSPosition` and `specified` (comma-separated) feeds
    /// `SpecifiedTSID`. Parameters not used by the kind are ignored.
    pub fn from_params(
        kind: SelectionKind,
        tsid: Option<&str>,
        ensemble_id: Option<&str>,
        position: Option<&str>,
        specified: Option<&str>,
    ) -> SelectResult<Self> {
        fn non_empty(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }
        let pattern = || {
            non_empty(tsid)
                .map(Pattern::new)
                .ok_or_else(|| SelectError::missing(kind.name(), "TSID"))
        };

        Ok(match kind {
            SelectionKind::AllTs => SelectionSpec::AllEntries,
            SelectionKind::AllMatchingTsid => SelectionSpec::AllMatching(pattern()?),
            SelectionKind::FirstMatchingTsid => SelectionSpec::FirstMatching(pattern()?),
            SelectionKind::LastMatchingTsid => SelectionSpec::LastMatching(pattern()?),
            SelectionKind::SelectedTs => SelectionSpec::Selected,
            SelectionKind::EnsembleId => SelectionSpec::EnsembleMembers(
                non_empty(ensemble_id)
                    .ok_or_else(|| SelectError::missing(kind.name(), "EnsembleID"))?
                    .to_string(),
            ),
            SelectionKind::TsPosition => SelectionSpec::Positions(PositionList::parse(
                non_empty(position).ok_or_else(|| SelectError::missing(kind.name(), "TSPosition"))?,
            )?),
            SelectionKind::SpecifiedTsid => {
                let list = non_empty(specified)
                    .ok_or_else(|| SelectError::missing(kind.name(), "SpecifiedTSID"))?;
                SelectionSpec::Explicit(
                    list.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                )
            }
        })
    }

    /// Parameters that reproduce this specification, `TSList` first
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("TSList", self.kind().name().to_string())];
        match self {
            SelectionSpec::AllEntries | SelectionSpec::Selected => {}
            SelectionSpec::AllMatching(p)
            | SelectionSpec::FirstMatching(p)
            | SelectionSpec::LastMatching(p) => params.push(("TSID", p.to_string())),
            SelectionSpec::EnsembleMembers(id) => params.push(("EnsembleID", id.clone())),
            SelectionSpec::Positions(list) => params.push(("TSPosition", list.to_string())),
            SelectionSpec::Explicit(ids) => params.push(("SpecifiedTSID", ids.join(","))),
        }
        params
    }
}

impl fmt::Display for SelectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.to_params();
        for (i, (name, value)) in params.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in SelectionKind::ALL {
            assert_eq!(kind.name().parse::<SelectionKind>().unwrap(), kind);
        }
        assert_eq!(
            "allmatchingtsid".parse::<SelectionKind>().unwrap(),
            SelectionKind::AllMatchingTsid
        );
        assert!("Everything".parse::<SelectionKind>().is_err());
    }

    #[test]
    fn test_from_params() {
        let spec =
            SelectionSpec::from_params(SelectionKind::AllMatchingTsid, Some("A*"), None, None, None)
                .unwrap();
        assert_eq!(spec, SelectionSpec::all_matching("A*"));

        let spec = SelectionSpec::from_params(
            SelectionKind::SpecifiedTsid,
            None,
            None,
            None,
            Some("B1, A1"),
        )
        .unwrap();
        assert_eq!(
            spec,
            SelectionSpec::Explicit(vec!["B1".to_string(), "A1".to_string()])
        );
    }

    #[test]
    fn test_from_params_missing_companion() {
        let err = SelectionSpec::from_params(SelectionKind::EnsembleId, None, None, None, None)
            .unwrap_err();
        assert_eq!(err, SelectError::missing("EnsembleID", "EnsembleID"));

        assert!(
            SelectionSpec::from_params(SelectionKind::FirstMatchingTsid, Some("  "), None, None, None)
                .is_err()
        );
    }

    #[test]
    fn test_to_params() {
        let spec = SelectionSpec::from_params(
            SelectionKind::TsPosition,
            None,
            None,
            Some("2,4-5"),
            None,
        )
        .unwrap();
        assert_eq!(spec.to_string(), "TSList=TSPosition,TSPosition=2,4-5");
        assert_eq!(SelectionSpec::AllEntries.to_string(), "TSList=AllTS");
    }
}
