//! Request DTOs for the blurhash server API

use serde::Deserialize;

use crate::imaging::blurhash::DEFAULT_COMPONENTS;
use crate::imaging::Components;

/// Query string of `GET /:img`
///
/// # Fields
/// - `componentX`: horizontal grid resolution, 1 to 9 (default 4)
/// - `componentY`: vertical grid resolution, 1 to 9 (default 4)
#[derive(Debug, Clone, Deserialize)]
pub struct HashQuery {
    #[serde(rename = "componentX", default = "default_component")]
    pub component_x: u32,
    #[serde(rename = "componentY", default = "default_component")]
    pub component_y: u32,
}

fn default_component() -> u32 {
    u32::from(DEFAULT_COMPONENTS)
}

impl Default for HashQuery {
    fn default() -> Self {
        Self {
            component_x: default_component(),
            component_y: default_component(),
        }
    }
}

impl HashQuery {
    /// Validates the grid resolution.
    ///
    /// Returns an error message if validation fails.
    pub fn components(&self) -> Result<Components, String> {
        Components::new(self.component_x, self.component_y).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query: HashQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.component_x, 4);
        assert_eq!(query.component_y, 4);
        assert_eq!(query.components().unwrap(), Components::default());
    }

    #[test]
    fn test_query_camel_case_names() {
        let query: HashQuery = serde_json::from_str(r#"{"componentX": 1, "componentY": 9}"#).unwrap();
        let components = query.components().unwrap();
        assert_eq!((components.x(), components.y()), (1, 9));
    }

    #[test]
    fn test_query_out_of_range() {
        let query = HashQuery {
            component_x: 10,
            component_y: 4,
        };
        assert!(query.components().is_err());

        let query = HashQuery {
            component_x: 4,
            component_y: 0,
        };
        assert!(query.components().is_err());
    }
}
