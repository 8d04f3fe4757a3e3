use crate::core::UnitValue;
use crate::core::error::UnitError;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;

/// The declared parameter list of a callable.
///
/// Defaults bind to the trailing parameters: with `N` defaults, the last `N`
/// names are optional and the rest are required. `defaults` is `None` when the
/// callable declares no default list at all, which is kept distinct from an
/// empty list.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct FunctionSignature {
    params: Vec<String>,
    defaults: Option<Vec<UnitValue>>,
}

impl FunctionSignature {
    /// A signature with no parameters and no default list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a signature from its raw parts, rejecting duplicate names and
    /// default lists longer than the parameter list.
    pub fn try_new(
        params: Vec<String>,
        defaults: Option<Vec<UnitValue>>,
    ) -> Result<Self, UnitError> {
        let mut seen = HashSet::new();
        for param in &params {
            if param.is_empty() {
                return Err(UnitError::InvalidSignature(
                    "empty parameter name".to_string(),
                ));
            }
            if !seen.insert(param.as_str()) {
                return Err(UnitError::InvalidSignature(format!(
                    "duplicate parameter '{}'",
                    param
                )));
            }
        }

        if let Some(defaults) = &defaults {
            if defaults.len() > params.len() {
                return Err(UnitError::InvalidSignature(format!(
                    "{} defaults declared for {} parameters",
                    defaults.len(),
                    params.len()
                )));
            }
        }

        Ok(Self { params, defaults })
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn defaults(&self) -> Option<&[UnitValue]> {
        self.defaults.as_deref()
    }

    /// Splits the parameter list into required names and the ordered
    /// name -> default mapping of the trailing defaulted parameters.
    pub fn split(&self) -> (Vec<String>, Option<IndexMap<String, UnitValue>>) {
        let karg_count = self.defaults.as_ref().map_or(0, Vec::len);
        let split_at = self.params.len().saturating_sub(karg_count);

        let required = self.params[..split_at].to_vec();
        let optional = self.defaults.as_ref().map(|defaults| {
            self.params[split_at..]
                .iter()
                .cloned()
                .zip(defaults.iter().cloned())
                .collect()
        });

        (required, optional)
    }
}

impl FromStr for FunctionSignature {
    type Err = UnitError;

    /// Parses shorthand syntax: "x, y, z=5, w=7".
    ///
    /// Default values are read as JSON literals and fall back to plain
    /// strings, so `mode=fast` and `mode="fast"` are equivalent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut params = Vec::new();
        let mut defaults: Option<Vec<UnitValue>> = None;

        for part in split_top_level(s) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            match part.split_once('=') {
                Some((name, raw)) => {
                    let raw = raw.trim();
                    let value = serde_json::from_str(raw)
                        .unwrap_or_else(|_| UnitValue::String(raw.to_string()));
                    params.push(name.trim().to_string());
                    defaults.get_or_insert_with(Vec::new).push(value);
                }
                None => {
                    if defaults.is_some() {
                        return Err(UnitError::InvalidSignature(format!(
                            "parameter '{}' without default follows a defaulted parameter",
                            part
                        )));
                    }
                    params.push(part.to_string());
                }
            }
        }

        Self::try_new(params, defaults)
    }
}

/// Splits on commas that are not nested inside brackets, braces or quotes.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Macro for rapid signature creation: signature!("x, y, z=5")
#[macro_export]
macro_rules! signature {
    ($s:expr) => {
        $s.parse::<$crate::FunctionSignature>()
            .expect("Invalid signature shorthand")
    };
}
