use serde::{de, Deserialize, Deserializer, Serialize};

/// How a viewer should position the target page when a TOC link is followed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomHint {
    /// Scroll to the top edge of the target page, keeping the viewer's zoom.
    TopOfPage,
    /// Jump to the top-left corner at a fixed magnification.
    Fixed(f32),
}

impl Default for ZoomHint {
    fn default() -> Self {
        ZoomHint::Fixed(1.0)
    }
}

impl<'de> Deserialize<'de> for ZoomHint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ZoomDef {
            Factor(f32),
            Named(String),
            Tagged { fixed: f32 },
        }

        match ZoomDef::deserialize(deserializer)? {
            ZoomDef::Factor(f) | ZoomDef::Tagged { fixed: f } => Ok(ZoomHint::Fixed(f)),
            ZoomDef::Named(name) => match name.as_str() {
                "top_of_page" | "top" => Ok(ZoomHint::TopOfPage),
                other => other
                    .trim()
                    .parse::<f32>()
                    .map(ZoomHint::Fixed)
                    .map_err(|_| de::Error::custom(format!("unknown zoom hint '{}'", other))),
            },
        }
    }
}
