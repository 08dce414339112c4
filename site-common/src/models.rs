use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::timestamp;

/// Student society - the fixed set of societies the site lists
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Society {
    AntennasAndPropagation,
    Computer,
    ComputationalIntelligence,
    EngineeringInMedicineAndBiology,
    GeoscienceAndRemoteSensing,
    MicrowaveTheoryAndTechnology,
    Photonics,
    RoboticsAndAutomation,
    VehicularTechnology,
    WomenInEngineering,
}

impl Society {
    /// All societies, in the order the filter dropdowns show them
    pub const ALL: [Society; 10] = [
        Society::AntennasAndPropagation,
        Society::Computer,
        Society::ComputationalIntelligence,
        Society::EngineeringInMedicineAndBiology,
        Society::GeoscienceAndRemoteSensing,
        Society::MicrowaveTheoryAndTechnology,
        Society::Photonics,
        Society::RoboticsAndAutomation,
        Society::VehicularTechnology,
        Society::WomenInEngineering,
    ];

    /// Display name, also the value stored in the `society` column
    pub fn name(self) -> &'static str {
        match self {
            Society::AntennasAndPropagation => "Antennas and Propagation Society",
            Society::Computer => "Computer Society",
            Society::ComputationalIntelligence => "Computational Intelligence Society",
            Society::EngineeringInMedicineAndBiology => "Engineering in Medicine and Biology Society",
            Society::GeoscienceAndRemoteSensing => "Geoscience and Remote Sensing Society",
            Society::MicrowaveTheoryAndTechnology => "Microwave Theory and Technology Society",
            Society::Photonics => "Photonics Society",
            Society::RoboticsAndAutomation => "Robotics and Automation Society",
            Society::VehicularTechnology => "Vehicular Technology Society",
            Society::WomenInEngineering => "Women in Engineering",
        }
    }

    /// Path segment of the society page, `/societies/<slug>`
    pub fn slug(self) -> &'static str {
        match self {
            Society::AntennasAndPropagation => "antennas-and-propagation",
            Society::Computer => "computer-society",
            Society::ComputationalIntelligence => "computational-intelligence",
            Society::EngineeringInMedicineAndBiology => "engineering-in-medicine-and-biology",
            Society::GeoscienceAndRemoteSensing => "geoscience-and-remote-sensing",
            Society::MicrowaveTheoryAndTechnology => "microwave-theory-and-technology",
            Society::Photonics => "photonics-society",
            Society::RoboticsAndAutomation => "robotics-and-automation",
            Society::VehicularTechnology => "vehicular-technology",
            Society::WomenInEngineering => "women-in-engineering",
        }
    }

    pub fn from_name(name: &str) -> Option<Society> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn from_slug(slug: &str) -> Option<Society> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    /// Names of all societies
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.name()).collect()
    }
}

/// Event row of the `events` table
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Start of the event
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Society name, one of [`Society::name`]
    #[serde(default, deserialize_with = "null_as_empty")]
    pub society: String,
}

impl Event {
    /// Columns requested from the `events` table
    pub const COLUMNS: &'static [&'static str] =
        &["title", "description", "date", "venue", "image_url", "society"];
}

/// Article row of the `articles` table
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Article {
    /// Row id; numeric ids are kept in their decimal form
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publication: String,
    #[serde(with = "timestamp")]
    pub publication_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub article_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub society: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub short_description: String,
}

impl Article {
    /// Columns requested from the `articles` table
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "author",
        "publication",
        "publication_date",
        "article_url",
        "image_url",
        "society",
        "short_description",
    ];
}

// Text columns may come back as null
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}
