use log::debug;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::images::ImageSearch;

/// A capitalised word other than `Pose` itself
const NAME_WORD: &str = r"(?:[A-OQ-Z][A-Za-z'\-]*|P(?:[A-Za-np-z'\-][A-Za-z'\-]*|o(?:[A-Za-rt-z'\-][A-Za-z'\-]*|s(?:[A-Za-df-z'\-][A-Za-z'\-]*|e[A-Za-z'\-]+)?)?)?)";

/// Lowercase words allowed between capitalised ones, as in `Legs Up the Wall`
const CONNECTOR: &str = r"(?:of|the|and|up|on|to|a)";

/// Capitalised words, optionally joined by connectors, followed by the literal
/// word `Pose` and optionally wrapped in bold markers
static POSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:\*\*)?\b({word}(?:[ \t]+(?:{connector}[ \t]+)*{word})*)[ \t]+Pose\b(?:\*\*)?",
        word = NAME_WORD,
        connector = CONNECTOR
    ))
    .expect("Invalid pose regex")
});

/// Token standing in for a tile while the surrounding text is normalised
static TILE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}(\\d+)\u{E001}").expect("Invalid tile token regex"));

/// A pose named in the yoga section and the image found for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseReference {
    pub label: String,
    pub image_url: Option<String>,
}

impl PoseReference {
    /// Display name, e.g. `Tree Pose`
    pub fn name(&self) -> String {
        format!("{} Pose", self.label)
    }

    /// HTML list item for the pose
    pub fn tile(&self) -> String {
        let name = self.name();
        let body = match &self.image_url {
            Some(url) => format!(
                r#"<img src="{}" alt="{}" width="200">"#,
                html_escape::encode_double_quoted_attribute(url),
                html_escape::encode_double_quoted_attribute(&name)
            ),
            None => "No image found.".to_string(),
        };
        format!(
            "<li><strong>{}</strong><br>{}</li>",
            html_escape::encode_text(&name),
            body
        )
    }
}

/// Yoga text with pose names swapped for tokens, plus the tiles the tokens stand for
#[derive(Debug, Clone, Default)]
pub struct PoseTiles {
    pub text: String,
    pub poses: Vec<PoseReference>,
    tiles: Vec<String>,
}

impl PoseTiles {
    /// Put the tiles back in place of their tokens
    pub fn restore(&self, normalized: &str) -> String {
        TILE_TOKEN
            .replace_all(normalized, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.tiles.get(index))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

fn label_of(caps: &Captures) -> String {
    caps[1].split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pose labels in order of first appearance, without repeats
pub fn find_poses(text: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for caps in POSE.captures_iter(text) {
        let label = label_of(&caps);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Look up an image for every pose in `text` and replace each occurrence with a token.
///
/// Each distinct label is searched once; repeated mentions reuse the result.
/// The tokens survive normalisation untouched, so the image URLs are not
/// stripped along with the prose links.
pub async fn interpolate_poses(text: &str, images: &dyn ImageSearch) -> PoseTiles {
    let mut found: HashMap<String, Option<String>> = HashMap::new();
    let mut poses = Vec::new();

    for label in find_poses(text) {
        let image_url = images.lookup(&label).await;
        debug!("Pose '{}' image: {:?}", label, image_url);
        found.insert(label.clone(), image_url.clone());
        poses.push(PoseReference { label, image_url });
    }

    let mut tiles = Vec::new();
    let text = POSE
        .replace_all(text, |caps: &Captures| {
            let label = label_of(caps);
            let pose = PoseReference {
                image_url: found.get(&label).cloned().flatten(),
                label,
            };
            tiles.push(pose.tile());
            format!("\u{E000}{}\u{E001}", tiles.len() - 1)
        })
        .into_owned();

    PoseTiles { text, poses, tiles }
}
