//! Overpass API boundary resolver.
//!
//! Fetches a relation with all its member ways and nodes as OSM JSON and
//! converts each relation into a GeoJSON feature.

use std::time::Duration;

use geo::Coord;
use geojson::{Feature, JsonObject};
use hashbrown::HashMap;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use super::geometry::{assemble_boundary, stitch_rings};
use super::resolver::{select_relation, BoundaryResolver, RELATION_TYPE};
use crate::config::ClipConfig;
use crate::error::{ClipError, Result};

const USER_AGENT: &str = "streetclip/0.1 (street boundary clipping)";

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node {
        id: u64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: u64,
        #[serde(default)]
        nodes: Vec<u64>,
    },
    Relation {
        id: u64,
        #[serde(default)]
        members: Vec<Member>,
        #[serde(default)]
        tags: JsonObject,
    },
}

#[derive(Debug, Deserialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "ref")]
    pub id: u64,
    #[serde(default)]
    pub role: String,
}

/// Live resolver backed by an Overpass interpreter endpoint
pub struct OverpassResolver {
    client: Client,
    url: String,
    timeout: Duration,
}

impl OverpassResolver {
    pub fn new(config: &ClipConfig) -> Result<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClipError::Config(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            url: config.overpass_url.clone(),
            timeout,
        })
    }

    pub fn query(&self, relation_id: u64) -> String {
        format!(
            "[out:json][timeout:{}];relation({});(._;>;);out;",
            self.timeout.as_secs(),
            relation_id
        )
    }

    async fn fetch(&self, relation_id: u64) -> Result<OverpassResponse> {
        let query = self.query(relation_id);
        info!("Requesting relation {} from {}", relation_id, self.url);
        debug!("query: {}", query);

        let body: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("data", &query)
            .finish();

        let failure = |reason: String| ClipError::BoundaryFetchFailure {
            relation: relation_id,
            reason,
        };
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                ClipError::BoundaryFetchTimeout {
                    relation: relation_id,
                    secs: self.timeout.as_secs(),
                }
            } else {
                failure(e.to_string())
            }
        };

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("Overpass returned {}: {}", status, text);
            return Err(failure(format!("HTTP {}", status)));
        }

        response.json::<OverpassResponse>().await.map_err(classify)
    }
}

impl BoundaryResolver for OverpassResolver {
    async fn resolve(&self, relation_id: u64) -> Result<Feature> {
        let response = tokio::time::timeout(self.timeout, self.fetch(relation_id))
            .await
            .map_err(|_| ClipError::BoundaryFetchTimeout {
                relation: relation_id,
                secs: self.timeout.as_secs(),
            })??;

        info!("Overpass returned {} elements", response.elements.len());
        select_relation(relation_features(&response), relation_id)
    }
}

/// Convert every relation of an Overpass response into a feature
pub fn relation_features(response: &OverpassResponse) -> Vec<Feature> {
    let mut nodes: HashMap<u64, Coord<f64>> = HashMap::new();
    let mut ways: HashMap<u64, &[u64]> = HashMap::new();

    for element in &response.elements {
        match element {
            Element::Node { id, lat, lon } => {
                nodes.insert(*id, Coord { x: *lon, y: *lat });
            }
            Element::Way { id, nodes: refs } => {
                ways.insert(*id, refs.as_slice());
            }
            Element::Relation { .. } => {}
        }
    }

    response
        .elements
        .iter()
        .filter_map(|element| match element {
            Element::Relation { id, members, tags } => {
                Some(relation_feature(*id, members, tags, &nodes, &ways))
            }
            _ => None,
        })
        .collect()
}

fn relation_feature(
    id: u64,
    members: &[Member],
    tags: &JsonObject,
    nodes: &HashMap<u64, Coord<f64>>,
    ways: &HashMap<u64, &[u64]>,
) -> Feature {
    let mut outer = Vec::new();
    let mut inner = Vec::new();

    for member in members.iter().filter(|m| m.kind == "way") {
        let Some(refs) = ways.get(&member.id) else {
            debug!("Relation {} references missing way {}", id, member.id);
            continue;
        };

        // a way with holes in its node list would bend the ring
        let Some(coords) = refs
            .iter()
            .map(|n| nodes.get(n).copied())
            .collect::<Option<Vec<Coord<f64>>>>()
        else {
            debug!("Relation {} way {} references missing nodes", id, member.id);
            continue;
        };

        match member.role.as_str() {
            "outer" | "" => outer.push(coords),
            "inner" => inner.push(coords),
            other => debug!("Ignoring way {} with role {:?}", member.id, other),
        }
    }

    let geometry = assemble_boundary(stitch_rings(outer), stitch_rings(inner));
    if geometry.is_none() {
        warn!("Relation {} has no resolvable member ways", id);
    }

    let mut properties = JsonObject::new();
    properties.insert("type".into(), JsonValue::from(RELATION_TYPE));
    properties.insert("id".into(), JsonValue::from(id));
    properties.insert("tags".into(), JsonValue::Object(tags.clone()));

    Feature {
        bbox: None,
        geometry: geometry.map(|g| geojson::Geometry::new(geojson::Value::from(&g))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
