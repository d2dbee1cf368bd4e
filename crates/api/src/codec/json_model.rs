//! Google-style JSON DNS document.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonResponse {
    #[serde(rename = "Status")]
    pub status: u32,
    #[serde(rename = "TC")]
    pub tc: bool,
    #[serde(rename = "RD")]
    pub rd: bool,
    #[serde(rename = "RA")]
    pub ra: bool,
    #[serde(rename = "AD")]
    pub ad: bool,
    #[serde(rename = "CD")]
    pub cd: bool,
    #[serde(rename = "Question")]
    pub question: QuestionList,
    #[serde(rename = "Answer", default, skip_serializing_if = "Vec::is_empty")]
    pub answer: Vec<JsonRecord>,
    #[serde(rename = "Authority", default, skip_serializing_if = "Vec::is_empty")]
    pub authority: Vec<JsonRecord>,
    #[serde(rename = "Additional", default, skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<JsonRecord>,
    #[serde(rename = "Comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edns_client_subnet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonQuestion {
    /// FQDN with trailing dot.
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: u16,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    #[serde(rename = "Expires")]
    pub expires: String,
    pub data: String,
}

/// Some resolvers send `Question` as a bare object instead of an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionList(pub Vec<JsonQuestion>);

impl<'de> Deserialize<'de> for QuestionList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<JsonQuestion>),
            One(JsonQuestion),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::Many(questions) => QuestionList(questions),
            OneOrMany::One(question) => QuestionList(vec![question]),
        })
    }
}
