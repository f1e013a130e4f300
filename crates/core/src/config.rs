//! Sweep configuration and selector whitelists.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Selector, CXX_DESTRUCT};
use crate::report::ReportFormat;

/// File names probed by [`SweepConfig::from_default_locations`], in order.
pub const DEFAULT_CONFIG_NAMES: [&str; 3] = [".machsweep.json", ".machsweep.yml", ".machsweep.yaml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Selector whitelist must be a JSON array of strings: {0}")]
    InvalidWhitelist(String),
}

/// Serializable configuration for one sweep.
///
/// Usually lives at `.machsweep.json` (or `.yml`) next to the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Extra selectors that are always treated as reachable.
    pub whitelist: Vec<Selector>,
    /// Include [`default_whitelist`] in the effective whitelist.
    pub use_default_whitelist: bool,
    /// Explicit otool executable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otool_path: Option<PathBuf>,
    /// Explicit swift-demangle executable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swift_demangle_path: Option<PathBuf>,
    /// Resolve Swift class names; raw mangled names are reported when off.
    pub demangle: bool,
    /// Parse class records in parallel.
    pub parallel: bool,
    /// Report format used when neither the CLI nor the output extension decides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_format: Option<ReportFormat>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            whitelist: Vec::new(),
            use_default_whitelist: true,
            otool_path: None,
            swift_demangle_path: None,
            demangle: true,
            parallel: true,
            report_format: None,
        }
    }
}

impl SweepConfig {
    /// Load a config file: YAML for `.yml`/`.yaml`, JSON otherwise.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = read(path)?;
        if is_yaml(path) {
            serde_yaml::from_str(&contents)
                .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source })
        } else {
            serde_json::from_str(&contents)
                .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
        }
    }

    /// Load the first config found in `dir`, or defaults when there is none.
    pub fn from_default_locations(dir: &Path) -> Result<Self, ConfigError> {
        for name in DEFAULT_CONFIG_NAMES {
            let path = dir.join(name);
            if path.is_file() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Defaults (when enabled) + configured entries + `extra`.
    pub fn effective_whitelist<I, S>(&self, extra: I) -> BTreeSet<Selector>
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        let mut selectors = BTreeSet::new();
        if self.use_default_whitelist {
            selectors.extend(default_whitelist().iter().map(|s| s.to_string()));
        }
        selectors.extend(self.whitelist.iter().cloned());
        selectors.extend(extra.into_iter().map(Into::into));
        selectors
    }
}

/// Parse a whitelist given as a JSON array of strings, e.g. `["foo:", "bar"]`.
pub fn parse_whitelist_json(text: &str) -> Result<Vec<Selector>, ConfigError> {
    serde_json::from_str::<Vec<Selector>>(text)
        .map_err(|e| ConfigError::InvalidWhitelist(e.to_string()))
}

/// Load a whitelist file holding a JSON array or a YAML list of selectors.
pub fn load_whitelist_file(path: &Path) -> Result<Vec<Selector>, ConfigError> {
    let contents = read(path)?;
    if is_yaml(path) {
        serde_yaml::from_str(&contents)
            .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source })
    } else {
        parse_whitelist_json(&contents)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yml") | Some("yaml"))
}

/// Delegate and data-source callbacks that UIKit, WebKit and Foundation invoke
/// without any selector reference in the app binary.
pub fn default_whitelist() -> &'static [&'static str] {
    &[
        "numberOfSectionsInCollectionView:",
        "collectionView:didHighlightItemAtIndexPath:",
        "collectionView:didSelectItemAtIndexPath:",
        "collectionView:didUnhighlightItemAtIndexPath:",
        "collectionView:layout:sizeForItemAtIndexPath:",
        "collectionView:shouldHighlightItemAtIndexPath:",
        "collectionView:shouldSelectItemAtIndexPath:",
        "collectionView:willDisplayCell:forItemAtIndexPath:",
        "collectionView:viewForSupplementaryElementOfKind:atIndexPath:",
        "collectionView:layout:minimumLineSpacingForSectionAtIndex:",
        CXX_DESTRUCT,
        "tableView:numberOfRowsInSection:",
        "tableView:didSelectRowAtIndexPath:",
        "numberOfSectionsInTableView:",
        "tableView:titleForHeaderInSection:",
        "tableView:willDisplayCell:forRowAtIndexPath:",
        "tableView:willDisplayHeaderView:forSection:",
        "tableView:viewForFooterInSection:",
        "tableView:viewForHeaderInSection:",
        "tableView:heightForFooterInSection:",
        "tableView:heightForHeaderInSection:",
        "tableView:shouldShowMenuForRowAtIndexPath:",
        "tableView:shouldHighlightRowAtIndexPath:",
        "tableView:performAction:forRowAtIndexPath:withSender:",
        "tableView:canPerformAction:forRowAtIndexPath:withSender:",
        "tableView:canEditRowAtIndexPath:",
        "tableView:commitEditingStyle:forRowAtIndexPath:",
        "tableView:didEndEditingRowAtIndexPath:",
        "tableView:editingStyleForRowAtIndexPath:",
        "tableView:willBeginEditingRowAtIndexPath:",
        "gestureRecognizer:shouldReceiveTouch:",
        "gestureRecognizerShouldBegin:",
        "gestureRecognizer:shouldRecognizeSimultaneouslyWithGestureRecognizer:",
        "touchesShouldBegin:withEvent:inContentView:",
        "touchesShouldCancelInContentView:",
        "webView:didFailLoadWithError:",
        "webView:shouldStartLoadWithRequest:navigationType:",
        "webView:decidePolicyForNavigationAction:decisionHandler:",
        "webView:didFinishNavigation:",
        "webView:didReceiveServerRedirectForProvisionalNavigation:",
        "webView:didStartProvisionalNavigation:",
        "searchBarSearchButtonClicked:",
        "searchBarCancelButtonClicked:",
        "searchBarTextDidBeginEditing:",
        "searchBar:selectedScopeButtonIndexDidChange:",
        "searchBar:textDidChange:",
        "searchDisplayController:shouldReloadTableForSearchString:",
        "searchDisplayController:shouldReloadTableForSearchScope:",
        "searchDisplayController:willShowSearchResultsTableView:",
        "searchDisplayControllerWillBeginSearch:",
        "searchDisplayControllerWillEndSearch:",
        "searchDisplayControllerDidEndSearch:",
        "numberOfComponentsInPickerView:",
        "pickerView:titleForRow:forComponent:",
        "pickerView:widthForComponent:",
        "pickerView:didSelectRow:inComponent:",
        "pickerView:numberOfRowsInComponent:",
        "pickerView:viewForRow:forComponent:reusingView:",
        "alertView:didDismissWithButtonIndex:",
        "URLSession:didReceiveChallenge:completionHandler:",
        "URLSession:task:didReceiveChallenge:completionHandler:",
        "URLSession:didBecomeInvalidWithError:",
        "URLSession:task:needNewBodyStream:",
    ]
}
