//! Shell command construction for running GRASS inside a workflow step.
//!
//! An [`Invocation`] is assembled from typed [`Fragment`]s and only rendered
//! to a string at the end. The rendered statement sequence is:
//!
//! 1. reconcile leftovers of the previous run (`grassflow clean ...`)
//! 2. create the location when it is missing (only with EPSG or source file)
//! 3. `GRASS_OVERWRITE=1`
//! 4. run the command in the mapset, creating the mapset when missing
//!
//! Nothing is executed here.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::location::GrassLocation;
use crate::map_name::MapNameExpr;
use crate::shell::quote_arg;

pub const OVERWRITE_ENV_VAR: &str = "GRASS_OVERWRITE";
pub const DEFAULT_OUTPUTS_PLACEHOLDER: &str = "{output}";

/// One command-line token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellArg {
    /// Plain value, quoted when it contains shell metacharacters.
    Literal(String),
    /// Shell expression emitted verbatim so the shell evaluates it.
    Expr(String),
}

impl ShellArg {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn expr(value: impl Into<String>) -> Self {
        Self::Expr(value.into())
    }

    pub fn render(&self) -> String {
        match self {
            Self::Literal(value) => quote_arg(value),
            Self::Expr(value) => value.clone(),
        }
    }
}

impl From<&str> for ShellArg {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for ShellArg {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<&Path> for ShellArg {
    fn from(value: &Path) -> Self {
        Self::Literal(value.display().to_string())
    }
}

impl From<PathBuf> for ShellArg {
    fn from(value: PathBuf) -> Self {
        Self::Literal(value.display().to_string())
    }
}

impl From<MapNameExpr> for ShellArg {
    fn from(value: MapNameExpr) -> Self {
        Self::Expr(value.into_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KwargValue {
    Single(ShellArg),
    /// Rendered comma-separated.
    List(Vec<ShellArg>),
}

impl KwargValue {
    pub fn render(&self) -> String {
        match self {
            Self::Single(arg) => arg.render(),
            Self::List(args) => args
                .iter()
                .map(ShellArg::render)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

macro_rules! single_kwarg_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for KwargValue {
                fn from(value: $ty) -> Self {
                    Self::Single(value.into())
                }
            }
        )*
    };
}

single_kwarg_from!(ShellArg, &str, String, &Path, PathBuf, MapNameExpr);

impl From<Vec<ShellArg>> for KwargValue {
    fn from(values: Vec<ShellArg>) -> Self {
        Self::List(values)
    }
}

/// A piece of the rendered shell statement sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    Cleanup {
        executable: String,
        location_path: PathBuf,
        outputs: String,
    },
    LocationGuard {
        executable: String,
        location_path: PathBuf,
        source: String,
    },
    Environment {
        name: String,
        value: String,
    },
    Exec {
        executable: String,
        mapset_path: PathBuf,
        command: String,
    },
}

impl Fragment {
    pub fn render(&self) -> String {
        match self {
            Self::Cleanup {
                executable,
                location_path,
                outputs,
            } => format!(
                "{} clean {} {}; ",
                quote_arg(executable),
                quote_arg(&location_path.display().to_string()),
                quote_arg(outputs)
            ),
            Self::LocationGuard {
                executable,
                location_path,
                source,
            } => {
                let location = quote_arg(&location_path.display().to_string());
                format!(
                    "test ! -d {0} && {1} -e -c {2} {0}; ",
                    location,
                    quote_arg(executable),
                    quote_arg(source)
                )
            }
            Self::Environment { name, value } => format!("{}={} ", name, quote_arg(value)),
            Self::Exec {
                executable,
                mapset_path,
                command,
            } => {
                let mapset = quote_arg(&mapset_path.display().to_string());
                format!(
                    "{} `test ! -d {1} && echo -c` {1} --exec {2} ; ",
                    quote_arg(executable),
                    mapset,
                    command
                )
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    location: &'a GrassLocation,
    /// Leading text of the command line, emitted as written.
    command: String,
    args: Vec<ShellArg>,
    kwargs: Vec<(String, KwargValue)>,
    mapset: Option<String>,
    clean: bool,
    outputs: String,
}

impl GrassLocation {
    /// Start building a GRASS invocation of `command` in this location.
    /// `command` may carry its own flags (`"g.region -p"`); it is not quoted.
    pub fn invocation(&self, command: impl Into<String>) -> Invocation<'_> {
        Invocation {
            location: self,
            command: command.into(),
            args: Vec::new(),
            kwargs: Vec::new(),
            mapset: None,
            clean: true,
            outputs: DEFAULT_OUTPUTS_PLACEHOLDER.to_string(),
        }
    }

    /// Source for `grass -e -c`: the location file wins over the EPSG code.
    pub fn location_source(&self) -> Option<String> {
        if let Some(file) = &self.location_file {
            return Some(file.display().to_string());
        }
        self.epsg.map(|code| format!("EPSG:{}", code))
    }
}

impl<'a> Invocation<'a> {
    pub fn arg(mut self, arg: impl Into<ShellArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ShellArg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<KwargValue>) -> Self {
        self.kwargs.push((key.into(), value.into()));
        self
    }

    pub fn kwarg_list<I, T>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ShellArg>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.kwargs.push((key.into(), KwargValue::List(values)));
        self
    }

    pub fn mapset(mut self, mapset: impl Into<String>) -> Self {
        self.mapset = Some(mapset.into());
        self
    }

    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Output list handed to the cleanup step (`{output}` by default).
    pub fn cleanup_outputs(mut self, outputs: impl Into<String>) -> Self {
        self.outputs = outputs.into();
        self
    }

    /// The command line run inside GRASS.
    pub fn command_line(&self) -> String {
        let mut tokens = Vec::with_capacity(1 + self.args.len() + self.kwargs.len());
        tokens.push(self.command.clone());
        tokens.extend(self.args.iter().map(ShellArg::render));
        tokens.extend(
            self.kwargs
                .iter()
                .map(|(key, value)| format!("{}={}", quote_arg(key), value.render())),
        );
        tokens.join(" ")
    }

    pub fn fragments(&self) -> Result<Vec<Fragment>> {
        let location = self.location;
        let location_path = location.location_path();
        let mut fragments = Vec::with_capacity(4);

        if self.clean {
            fragments.push(Fragment::Cleanup {
                executable: location.cleanup_executable.clone(),
                location_path: location_path.clone(),
                outputs: self.outputs.clone(),
            });
        }

        if let Some(source) = location.location_source() {
            fragments.push(Fragment::LocationGuard {
                executable: location.grass_executable.clone(),
                location_path,
                source,
            });
        }

        fragments.push(Fragment::Environment {
            name: OVERWRITE_ENV_VAR.to_string(),
            value: "1".to_string(),
        });

        fragments.push(Fragment::Exec {
            executable: location.grass_executable.clone(),
            mapset_path: location.mapset_path(self.mapset.as_deref())?,
            command: self.command_line(),
        });

        Ok(fragments)
    }

    pub fn render(&self) -> Result<String> {
        Ok(self
            .fragments()?
            .iter()
            .map(Fragment::render)
            .collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_name::{input_to_map, output_to_map};

    fn location() -> GrassLocation {
        GrassLocation::new("/g", "utm")
    }

    #[test]
    fn renders_full_sequence_in_order() {
        let loc = location().with_epsg(32632);
        let rendered = loc
            .invocation("r.slope.aspect")
            .kwarg("elevation", input_to_map(None))
            .kwarg("slope", output_to_map(None))
            .render()
            .unwrap();

        assert_eq!(
            rendered,
            "grassflow clean /g/utm '{output}'; \
             test ! -d /g/utm && grass -e -c EPSG:32632 /g/utm; \
             GRASS_OVERWRITE=1 \
             grass `test ! -d /g/utm/PERMANENT && echo -c` /g/utm/PERMANENT --exec \
             r.slope.aspect \
             elevation=$(basename {input})@$(basename $(dirname $(dirname {input}))) \
             slope=$(basename {output}) ; "
        );
    }

    #[test]
    fn no_location_guard_without_source() {
        let fragments = location().invocation("g.region").fragments().unwrap();
        assert!(!fragments
            .iter()
            .any(|f| matches!(f, Fragment::LocationGuard { .. })));
        assert_eq!(fragments.len(), 3);
    }

    #[test]
    fn location_file_wins_over_epsg() {
        let loc = location()
            .with_epsg(4326)
            .with_location_file("/data/dem.tif");
        assert_eq!(loc.location_source().as_deref(), Some("/data/dem.tif"));
    }

    #[test]
    fn clean_false_drops_cleanup_fragment() {
        let rendered = location()
            .invocation("g.region")
            .clean(false)
            .render()
            .unwrap();
        assert!(rendered.starts_with("GRASS_OVERWRITE=1 grass "));
    }

    #[test]
    fn fragment_order_is_fixed() {
        let fragments = location()
            .with_epsg(4326)
            .invocation("g.region")
            .fragments()
            .unwrap();
        let kinds: Vec<&str> = fragments
            .iter()
            .map(|f| match f {
                Fragment::Cleanup { .. } => "cleanup",
                Fragment::LocationGuard { .. } => "location",
                Fragment::Environment { .. } => "env",
                Fragment::Exec { .. } => "exec",
            })
            .collect();
        assert_eq!(kinds, vec!["cleanup", "location", "env", "exec"]);
    }

    #[test]
    fn explicit_mapset_is_used() {
        let rendered = location()
            .invocation("g.region")
            .mapset("basin")
            .clean(false)
            .render()
            .unwrap();
        assert!(rendered.contains("--exec g.region ; "));
        assert!(rendered.contains("`test ! -d /g/utm/basin && echo -c` /g/utm/basin"));
    }

    #[test]
    fn missing_default_mapset_propagates() {
        let loc = location().with_default_mapset(None::<String>);
        let err = loc.invocation("g.region").render().unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
    }

    #[test]
    fn command_line_joins_args_and_kwargs() {
        let loc = location();
        let invocation = loc
            .invocation("v.in.ogr")
            .arg("-o")
            .arg("--quiet")
            .kwarg("input", "/data/my rivers.shp")
            .kwarg_list("columns", ["cat", "name"]);

        assert_eq!(
            invocation.command_line(),
            "v.in.ogr -o --quiet input='/data/my rivers.shp' columns=cat,name"
        );
    }

    #[test]
    fn command_with_flags_is_emitted_verbatim() {
        let rendered = location()
            .invocation("g.region -p")
            .clean(false)
            .render()
            .unwrap();
        assert!(rendered.ends_with("--exec g.region -p ; "));

        let loc = location();
        let invocation = loc.invocation("r.univar map=dem").kwarg("zones", "my zones");
        assert_eq!(invocation.command_line(), "r.univar map=dem zones='my zones'");
    }

    #[test]
    fn literal_metacharacters_are_quoted() {
        assert_eq!(ShellArg::literal("a;rm -rf /").render(), "'a;rm -rf /'");
        assert_eq!(ShellArg::expr("$(basename x)").render(), "$(basename x)");
    }

    #[test]
    fn custom_outputs_placeholder() {
        let rendered = location()
            .invocation("g.region")
            .cleanup_outputs("{output.dem}")
            .render()
            .unwrap();
        assert!(rendered.starts_with("grassflow clean /g/utm '{output.dem}'; "));
    }

    #[test]
    fn fragments_serialize_with_kind_tag() {
        let fragments = location().invocation("g.region").fragments().unwrap();
        let json = serde_json::to_value(&fragments).unwrap();
        assert_eq!(json[0]["kind"], "cleanup");
        assert_eq!(json[1]["kind"], "environment");
        assert_eq!(json[2]["kind"], "exec");
        assert_eq!(json[2]["command"], "g.region");
    }
}
