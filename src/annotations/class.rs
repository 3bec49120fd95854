//! Event classes of the TUT Sound Events 2017 street scene.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sound event classes annotated in TUT-SED 2017.
///
/// The dataset adapter hands out raw label strings; callers that want an
/// integer target can convert with [`EventClass::from_str`] and
/// [`EventClass::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventClass {
    BrakesSqueaking = 0,
    Car = 1,
    Children = 2,
    LargeVehicle = 3,
    PeopleSpeaking = 4,
    PeopleWalking = 5,
}

impl EventClass {
    /// All classes in index order
    pub const ALL: [EventClass; 6] = [
        EventClass::BrakesSqueaking,
        EventClass::Car,
        EventClass::Children,
        EventClass::LargeVehicle,
        EventClass::PeopleSpeaking,
        EventClass::PeopleWalking,
    ];

    /// Number of classes
    pub const COUNT: usize = Self::ALL.len();

    /// Stable class index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Class for a given index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Label as written in the annotation files
    pub fn as_str(self) -> &'static str {
        match self {
            EventClass::BrakesSqueaking => "brakes squeaking",
            EventClass::Car => "car",
            EventClass::Children => "children",
            EventClass::LargeVehicle => "large vehicle",
            EventClass::PeopleSpeaking => "people speaking",
            EventClass::PeopleWalking => "people walking",
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| format!("unknown event label '{}'", s))
    }
}
