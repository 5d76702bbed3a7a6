use crate::type_expr::TypeExpr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Protocol phase a packet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolState {
    Handshaking,
    Status,
    Login,
    Configuration,
    Play,
}

impl ProtocolState {
    pub const ALL: [ProtocolState; 5] = [
        ProtocolState::Handshaking,
        ProtocolState::Status,
        ProtocolState::Login,
        ProtocolState::Configuration,
        ProtocolState::Play,
    ];

    /// Lower-case keyword as it appears in the wiki's State column.
    pub fn keyword(self) -> &'static str {
        match self {
            ProtocolState::Handshaking => "handshaking",
            ProtocolState::Status => "status",
            ProtocolState::Login => "login",
            ProtocolState::Configuration => "configuration",
            ProtocolState::Play => "play",
        }
    }

    /// Recognize a state from a heading id or heading text by substring.
    ///
    /// `configuration` is checked first and handshaking matches on `handshak`
    /// so both "Handshake" and "Handshaking" headings resolve.
    pub fn from_heading(text: &str) -> Option<Self> {
        let t = text.trim().to_lowercase();
        if t.contains("configuration") {
            Some(ProtocolState::Configuration)
        } else if t.contains("handshak") {
            Some(ProtocolState::Handshaking)
        } else if t.contains("status") {
            Some(ProtocolState::Status)
        } else if t.contains("login") {
            Some(ProtocolState::Login)
        } else if t.contains("play") {
            Some(ProtocolState::Play)
        } else {
            None
        }
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ProtocolState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProtocolState::ALL
            .into_iter()
            .find(|st| st.keyword() == s)
            .ok_or_else(|| format!("unknown protocol state: {s}"))
    }
}

/// Which side sends a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Clientbound,
    Serverbound,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Clientbound => "clientbound",
            Direction::Serverbound => "serverbound",
        }
    }

    pub fn from_heading(text: &str) -> Option<Self> {
        let t = text.trim().to_lowercase();
        if t.contains("clientbound") {
            Some(Direction::Clientbound)
        } else if t.contains("serverbound") {
            Some(Direction::Serverbound)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clientbound" => Ok(Direction::Clientbound),
            "serverbound" => Ok(Direction::Serverbound),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketSpec {
    pub name: String,
    pub id: String,
    pub resource: String,
    pub notes: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Buckets {
    pub clientbound: Vec<PacketSpec>,
    pub serverbound: Vec<PacketSpec>,
}

impl Buckets {
    pub fn get(&self, direction: Direction) -> &Vec<PacketSpec> {
        match direction {
            Direction::Clientbound => &self.clientbound,
            Direction::Serverbound => &self.serverbound,
        }
    }

    pub fn get_mut(&mut self, direction: Direction) -> &mut Vec<PacketSpec> {
        match direction {
            Direction::Clientbound => &mut self.clientbound,
            Direction::Serverbound => &mut self.serverbound,
        }
    }
}

/// Every packet scraped in one pass, keyed by state then direction.
///
/// All ten buckets always exist; the struct shape makes that a type-level
/// guarantee instead of a map invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub handshaking: Buckets,
    pub status: Buckets,
    pub login: Buckets,
    pub configuration: Buckets,
    pub play: Buckets,
}

impl Schema {
    pub fn state(&self, state: ProtocolState) -> &Buckets {
        match state {
            ProtocolState::Handshaking => &self.handshaking,
            ProtocolState::Status => &self.status,
            ProtocolState::Login => &self.login,
            ProtocolState::Configuration => &self.configuration,
            ProtocolState::Play => &self.play,
        }
    }

    pub fn state_mut(&mut self, state: ProtocolState) -> &mut Buckets {
        match state {
            ProtocolState::Handshaking => &mut self.handshaking,
            ProtocolState::Status => &mut self.status,
            ProtocolState::Login => &mut self.login,
            ProtocolState::Configuration => &mut self.configuration,
            ProtocolState::Play => &mut self.play,
        }
    }

    pub fn bucket(&self, state: ProtocolState, direction: Direction) -> &Vec<PacketSpec> {
        self.state(state).get(direction)
    }

    pub fn bucket_mut(&mut self, state: ProtocolState, direction: Direction) -> &mut Vec<PacketSpec> {
        self.state_mut(state).get_mut(direction)
    }

    /// Iterate all buckets in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (ProtocolState, Direction, &Vec<PacketSpec>)> {
        ProtocolState::ALL.into_iter().flat_map(move |st| {
            [Direction::Clientbound, Direction::Serverbound]
                .into_iter()
                .map(move |dir| (st, dir, self.bucket(st, dir)))
        })
    }

    pub fn packet_count(&self) -> usize {
        self.iter().map(|(_, _, packets)| packets.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_from_heading_variants() {
        assert_eq!(
            ProtocolState::from_heading("Handshake"),
            Some(ProtocolState::Handshaking)
        );
        assert_eq!(
            ProtocolState::from_heading(" Configuration "),
            Some(ProtocolState::Configuration)
        );
        assert_eq!(ProtocolState::from_heading("Play"), Some(ProtocolState::Play));
        assert_eq!(ProtocolState::from_heading("Navigation"), None);
        assert_eq!(
            Direction::from_heading("Serverbound"),
            Some(Direction::Serverbound)
        );
        assert_eq!(Direction::from_heading("See also"), None);
    }

    #[test]
    fn empty_schema_serializes_all_buckets() {
        let v = serde_json::to_value(Schema::default()).expect("serialize");
        let obj = v.as_object().expect("object");
        assert_eq!(obj.len(), 5);
        for st in ProtocolState::ALL {
            let buckets = obj[st.keyword()].as_object().expect("buckets");
            assert_eq!(buckets["clientbound"], serde_json::json!([]));
            assert_eq!(buckets["serverbound"], serde_json::json!([]));
        }
    }

    #[test]
    fn state_roundtrips_through_keyword() {
        for st in ProtocolState::ALL {
            assert_eq!(st.keyword().parse::<ProtocolState>(), Ok(st));
        }
        assert!("handshake".parse::<ProtocolState>().is_err());
    }
}
