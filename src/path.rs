//! Symbolic paths and their resolution to backend variables.
//!
//! A [`BuildPath`] is stored relative to a symbolic [`Root`]. Whether that
//! root becomes a `${variable}` reference or disappears into a relative path
//! is decided by the [`PathVars`] table supplied at render time.

use crate::ir::Variable;
use crate::platform::Platform;
use crate::safe_str::{Fragment, FormatError, Renderable, check_newline};
use std::collections::BTreeMap;
use std::fmt;

/// Installation directories a path may be relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstallRoot {
    /// Architecture-independent installation prefix.
    Prefix,
    /// Architecture-dependent installation prefix.
    ExecPrefix,
    /// Executables.
    BinDir,
    /// Libraries.
    LibDir,
    /// Headers.
    IncludeDir,
}

impl InstallRoot {
    /// Every install root, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Prefix,
        Self::ExecPrefix,
        Self::BinDir,
        Self::LibDir,
        Self::IncludeDir,
    ];

    /// Conventional variable name for this root.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::ExecPrefix => "exec_prefix",
            Self::BinDir => "bindir",
            Self::LibDir => "libdir",
            Self::IncludeDir => "includedir",
        }
    }
}

/// Base directory of a [`BuildPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Root {
    /// The source tree.
    SrcDir,
    /// The build tree; the backend runs from here.
    BuildDir,
    /// No base: the suffix is already absolute.
    Absolute,
    /// An installation directory.
    Install(InstallRoot),
}

impl Root {
    /// Name used when the root is shown to humans.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SrcDir => "srcdir",
            Self::BuildDir => "builddir",
            Self::Absolute => "",
            Self::Install(root) => root.name(),
        }
    }
}

/// A path relative to a symbolic root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildPath {
    root: Root,
    suffix: String,
    directory: bool,
    destdir: bool,
}

impl BuildPath {
    /// A file path below `root`. Separators are always `/`.
    #[must_use]
    pub fn new(root: Root, suffix: impl Into<String>) -> Self {
        Self {
            root,
            suffix: suffix.into(),
            directory: false,
            destdir: false,
        }
    }

    /// A path below `root` assembled from `components`.
    #[must_use]
    pub fn from_components<I>(root: Root, components: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let suffix = components
            .into_iter()
            .map(|part| part.as_ref().to_owned())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self::new(root, suffix)
    }

    /// A path below the source tree.
    #[must_use]
    pub fn srcdir(suffix: impl Into<String>) -> Self {
        Self::new(Root::SrcDir, suffix)
    }

    /// A path below the build tree.
    #[must_use]
    pub fn builddir(suffix: impl Into<String>) -> Self {
        Self::new(Root::BuildDir, suffix)
    }

    /// An installed path. It is staged under `DESTDIR` where supported.
    #[must_use]
    pub fn install(root: InstallRoot, suffix: impl Into<String>) -> Self {
        Self {
            destdir: true,
            ..Self::new(Root::Install(root), suffix)
        }
    }

    /// Mark this path as naming a directory.
    #[must_use]
    pub fn into_directory(self) -> Self {
        Self {
            directory: true,
            ..self
        }
    }

    /// Stage the path under `DESTDIR` where the platform supports it.
    #[must_use]
    pub fn with_destdir(self) -> Self {
        Self {
            destdir: true,
            ..self
        }
    }

    /// Drop the `DESTDIR` staging prefix.
    #[must_use]
    pub fn without_destdir(self) -> Self {
        Self {
            destdir: false,
            ..self
        }
    }

    /// Append a component.
    #[must_use]
    pub fn join(&self, component: &str) -> Self {
        let suffix = match (self.suffix.as_str(), component) {
            (base, "") => base.to_owned(),
            ("", part) => part.to_owned(),
            (base, part) => format!("{}/{part}", base.trim_end_matches('/')),
        };
        Self {
            suffix,
            directory: false,
            ..self.clone()
        }
    }

    /// Base directory.
    #[must_use]
    pub const fn root(&self) -> Root {
        self.root
    }

    /// Path below the root, `/`-separated.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether the path names a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.directory
    }

    /// Whether the path is staged under `DESTDIR`.
    #[must_use]
    pub const fn has_destdir(&self) -> bool {
        self.destdir
    }

    /// Reject suffixes the backend cannot represent.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the suffix contains a newline.
    pub fn validate(&self) -> Result<(), FormatError> {
        check_newline(&self.suffix)
    }

    /// Resolve the symbolic root against `vars`.
    ///
    /// Roots with a variable become a literal `${name}` reference followed by
    /// the suffix as ordinary text; roots without one leave only the suffix,
    /// or `.` when the suffix is empty.
    #[must_use]
    pub fn realize(&self, vars: &PathVars) -> Fragment {
        let mut head = Vec::new();
        if self.destdir
            && let Some(destdir) = vars.destdir()
        {
            head.push(destdir.use_var());
        }
        if let Some(var) = vars.get(self.root) {
            head.push(var.use_var());
        }

        if head.is_empty() {
            let text = if self.suffix.is_empty() {
                "."
            } else {
                self.suffix.as_str()
            };
            return Fragment::plain(text);
        }
        if !self.suffix.is_empty() {
            if !self.suffix.starts_with('/') {
                head.push(Fragment::plain("/"));
            }
            head.push(Fragment::plain(self.suffix.as_str()));
        }
        Fragment::Concat(head)
    }
}

/// Human-readable form laid out like [`BuildPath::realize`] with the
/// default variables, using `$(name)` for each variable.
impl fmt::Display for BuildPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = match self.root {
            Root::Absolute | Root::BuildDir => None,
            root => Some(root.name()),
        };
        if self.destdir {
            f.write_str("$(DESTDIR)")?;
        }
        if let Some(name) = root {
            write!(f, "$({name})")?;
        }
        let has_head = self.destdir || root.is_some();
        match self.suffix.as_str() {
            "" if has_head => Ok(()),
            "" => f.write_str("."),
            suffix if has_head && !suffix.starts_with('/') => write!(f, "/{suffix}"),
            suffix => f.write_str(suffix),
        }
    }
}

impl Renderable for BuildPath {
    fn to_fragment(&self) -> Fragment {
        Fragment::Path(self.clone())
    }
}

/// Backend variables standing in for each symbolic root.
///
/// A root mapped to no variable is rendered as its bare suffix. This is the
/// case for the build directory, which is the backend's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVars {
    roots: BTreeMap<Root, Variable>,
    destdir: Option<Variable>,
}

impl PathVars {
    /// The conventional table for `platform`.
    ///
    /// `srcdir` and every install root map to variables of the same name,
    /// the build directory maps to nothing, and `DESTDIR` is only present on
    /// platforms that support staged installs.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        let mut roots = BTreeMap::new();
        roots.insert(Root::SrcDir, Variable::new("srcdir"));
        for root in InstallRoot::ALL {
            roots.insert(Root::Install(root), Variable::new(root.name()));
        }
        let destdir = platform
            .supports_destdir()
            .then(|| Variable::new("DESTDIR"));
        Self { roots, destdir }
    }

    /// Variable for `root`, if it has one.
    #[must_use]
    pub fn get(&self, root: Root) -> Option<&Variable> {
        match root {
            Root::Absolute => None,
            other => self.roots.get(&other),
        }
    }

    /// Variable for an install root, if it has one.
    #[must_use]
    pub fn install(&self, root: InstallRoot) -> Option<&Variable> {
        self.get(Root::Install(root))
    }

    /// Map `root` to `var`, or to nothing. The absolute root never has a
    /// variable and is left unchanged.
    pub fn set(&mut self, root: Root, var: Option<Variable>) {
        if root == Root::Absolute {
            return;
        }
        match var {
            Some(var) => self.roots.insert(root, var),
            None => self.roots.remove(&root),
        };
    }

    /// The `DESTDIR` variable, if staged installs are supported.
    #[must_use]
    pub const fn destdir(&self) -> Option<&Variable> {
        self.destdir.as_ref()
    }

    /// Replace the `DESTDIR` variable.
    pub fn set_destdir(&mut self, var: Option<Variable>) {
        self.destdir = var;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn posix() -> PathVars {
        PathVars::for_platform(Platform::Linux)
    }

    #[rstest]
    fn builddir_paths_are_bare(posix: PathVars) {
        let path = BuildPath::from_components(Root::BuildDir, ["a", "b.o"]);
        assert_eq!(path.realize(&posix), Fragment::plain("a/b.o"));
    }

    #[rstest]
    fn empty_builddir_path_is_dot(posix: PathVars) {
        assert_eq!(BuildPath::builddir("").realize(&posix), Fragment::plain("."));
    }

    #[rstest]
    fn srcdir_paths_use_variable(posix: PathVars) {
        let realized = BuildPath::srcdir("main.c").realize(&posix);
        assert_eq!(
            realized,
            Fragment::Concat(vec![
                Fragment::literal("${srcdir}"),
                Fragment::plain("/"),
                Fragment::plain("main.c"),
            ])
        );
    }

    #[rstest]
    fn install_paths_are_staged_under_destdir(posix: PathVars) {
        let realized = BuildPath::install(InstallRoot::BinDir, "app").realize(&posix);
        assert_eq!(
            realized,
            Fragment::Concat(vec![
                Fragment::literal("${DESTDIR}"),
                Fragment::literal("${bindir}"),
                Fragment::plain("/"),
                Fragment::plain("app"),
            ])
        );
    }

    #[rstest]
    fn windows_has_no_destdir() {
        let vars = PathVars::for_platform(Platform::Windows);
        assert!(vars.destdir().is_none());
        let realized = BuildPath::install(InstallRoot::LibDir, "x.dll").realize(&vars);
        assert_eq!(
            realized,
            Fragment::Concat(vec![
                Fragment::literal("${libdir}"),
                Fragment::plain("/"),
                Fragment::plain("x.dll"),
            ])
        );
    }

    #[rstest]
    fn absolute_paths_with_destdir_skip_separator(posix: PathVars) {
        let path = BuildPath {
            destdir: true,
            ..BuildPath::new(Root::Absolute, "/usr/bin/app")
        };
        assert_eq!(
            path.realize(&posix),
            Fragment::Concat(vec![
                Fragment::literal("${DESTDIR}"),
                Fragment::plain("/usr/bin/app"),
            ])
        );
    }

    #[rstest]
    fn set_overrides_builddir(mut posix: PathVars) {
        posix.set(Root::BuildDir, Some(Variable::new("builddir")));
        let realized = BuildPath::builddir("out").realize(&posix);
        let Fragment::Concat(parts) = realized else {
            panic!("expected a concatenation");
        };
        assert_eq!(parts.first(), Some(&Fragment::literal("${builddir}")));
    }

    #[rstest]
    #[case(BuildPath::builddir("out").with_destdir(), "$(DESTDIR)/out")]
    #[case(BuildPath::new(Root::Absolute, "/usr/bin").with_destdir(), "$(DESTDIR)/usr/bin")]
    #[case(BuildPath::builddir("").with_destdir(), "$(DESTDIR)")]
    #[case(BuildPath::builddir(""), ".")]
    #[case(BuildPath::install(InstallRoot::BinDir, "app"), "$(DESTDIR)$(bindir)/app")]
    #[case(BuildPath::srcdir(""), "$(srcdir)")]
    fn display_follows_realized_layout(#[case] path: BuildPath, #[case] expected: &str) {
        assert_eq!(path.to_string(), expected);
    }

    #[rstest]
    fn join_and_display() {
        let path = BuildPath::srcdir("include").join("api.h");
        assert_eq!(path.suffix(), "include/api.h");
        assert_eq!(path.to_string(), "$(srcdir)/include/api.h");
    }
}
