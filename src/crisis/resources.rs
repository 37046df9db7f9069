use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisResource {
    pub name: &'static str,
    pub region: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'static str>,
    pub description: &'static str,
}

const RESOURCES: &[CrisisResource] = &[
    CrisisResource {
        name: "Emergency Services",
        region: "India",
        phone: Some("112"),
        url: None,
        description: "24/7 Emergency Response",
    },
    CrisisResource {
        name: "National Suicide Prevention Helpline",
        region: "India",
        phone: Some("1800-599-0019"),
        url: None,
        description: "24/7 Mental Health Support",
    },
    CrisisResource {
        name: "International Association for Suicide Prevention",
        region: "International",
        phone: None,
        url: Some("https://www.iasp.info/resources/Crisis_Centres/"),
        description: "Find crisis centers worldwide",
    },
    CrisisResource {
        name: "Crisis Text Line",
        region: "International",
        phone: None,
        url: None,
        description: "Available in select countries - check their website for availability",
    },
];

pub fn crisis_resources() -> &'static [CrisisResource] {
    RESOURCES
}
