use super::PackageType;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_APP_DIR: &str = "/Applications";

/// Response of `brew info --json=v2`.
#[derive(Debug, Default, Deserialize)]
pub struct InfoResponse {
    #[serde(default)]
    pub formulae: Vec<InfoDocument>,
    #[serde(default)]
    pub casks: Vec<InfoDocument>,
}

impl InfoResponse {
    /// Pick the entry for the requested type, or the first non-empty list when the type is unknown.
    pub fn select(self, package_type: PackageType) -> Option<(PackageType, InfoDocument)> {
        let InfoResponse { formulae, casks } = self;
        let first = |list: Vec<InfoDocument>, kind| list.into_iter().next().map(|doc| (kind, doc));

        match package_type {
            PackageType::Formula => first(formulae, PackageType::Formula),
            PackageType::Cask => first(casks, PackageType::Cask),
            PackageType::Unknown => first(formulae, PackageType::Formula)
                .or_else(|| first(casks, PackageType::Cask)),
        }
    }
}

/// One formula or cask object from `brew info`. The schema belongs to Homebrew,
/// so fields are read on demand.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct InfoDocument(Map<String, Value>);

impl InfoDocument {
    #[cfg(test)]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.str_field("desc")
    }

    pub fn homepage(&self) -> &str {
        self.str_field("homepage")
    }

    /// Formulae list `{ "version": .. }` objects, casks a bare string.
    pub fn installed_version(&self) -> Option<String> {
        match self.0.get("installed")? {
            Value::String(version) if !version.is_empty() => Some(version.clone()),
            Value::Array(entries) => match entries.first()? {
                Value::Object(entry) => entry
                    .get("version")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                Value::String(version) => Some(version.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Name of the application bundle listed under the cask's `app` artifact.
    pub fn app_artifact(&self) -> Option<String> {
        self.0
            .get("artifacts")?
            .as_array()?
            .iter()
            .filter_map(|artifact| artifact.get("app"))
            .find_map(|app| app.as_array()?.first()?.as_str().map(str::to_string))
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_prefers_requested_type() {
        let response: InfoResponse = serde_json::from_value(json!({
            "formulae": [{ "name": "fork-cli" }],
            "casks": [{ "token": "fork" }]
        }))
        .unwrap();

        let (kind, doc) = response.select(PackageType::Cask).unwrap();
        assert_eq!(kind, PackageType::Cask);
        assert_eq!(doc.str_field("token"), "fork");
    }

    #[test]
    fn select_unknown_falls_back_to_casks() {
        let response: InfoResponse =
            serde_json::from_value(json!({ "casks": [{ "token": "arq" }] })).unwrap();
        let (kind, _) = response.select(PackageType::Unknown).unwrap();
        assert_eq!(kind, PackageType::Cask);
    }

    #[test]
    fn select_returns_none_when_empty() {
        assert!(InfoResponse::default().select(PackageType::Unknown).is_none());
    }

    #[test]
    fn installed_version_handles_both_shapes() {
        let formula = InfoDocument::from_json(json!({ "installed": [{ "version": "2.0" }] }));
        let cask = InfoDocument::from_json(json!({ "installed": "7.25" }));
        let missing = InfoDocument::from_json(json!({ "installed": null }));

        assert_eq!(formula.installed_version().as_deref(), Some("2.0"));
        assert_eq!(cask.installed_version().as_deref(), Some("7.25"));
        assert!(missing.installed_version().is_none());
    }

    #[test]
    fn reads_description_and_homepage() {
        let doc = InfoDocument::from_json(json!({
            "desc": "Multi-cloud backup",
            "homepage": "https://www.arqbackup.com/"
        }));
        assert_eq!(doc.description(), "Multi-cloud backup");
        assert_eq!(doc.homepage(), "https://www.arqbackup.com/");
        assert_eq!(InfoDocument::default().description(), "");
    }
}
