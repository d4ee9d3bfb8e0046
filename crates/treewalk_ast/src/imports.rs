//! Import declarations and compilation units.

use serde::Serialize;

use crate::{NodeKind, NodeList};

/// A single `import` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Import<'a> {
    /// Dotted name as written, e.g. `java.util.logging.Logger` or
    /// `java.util.*`.
    pub qualified_name: &'a str,
    /// `import static ...`
    pub is_static: bool,
}

impl<'a> Import<'a> {
    /// Creates a type import.
    pub const fn new(qualified_name: &'a str) -> Self {
        Self {
            qualified_name,
            is_static: false,
        }
    }

    /// Creates a static import.
    pub const fn new_static(qualified_name: &'a str) -> Self {
        Self {
            qualified_name,
            is_static: true,
        }
    }

    /// Last segment of the name (`*` for on-demand imports).
    pub fn simple_name(&self) -> &'a str {
        match self.qualified_name.rsplit_once('.') {
            Some((_, last)) => last,
            None => self.qualified_name,
        }
    }

    /// Everything before the last segment.
    pub fn qualifier(&self) -> Option<&'a str> {
        self.qualified_name
            .rsplit_once('.')
            .map(|(qualifier, _)| qualifier)
    }

    /// Returns true for `import a.b.*;` and `import static a.B.*;`.
    pub fn is_on_demand(&self) -> bool {
        self.simple_name() == "*"
    }

    /// Returns true if this declaration makes the type `qualified` visible
    /// by its simple name.
    pub fn imports_type(&self, qualified: &str) -> bool {
        if self.is_static {
            return false;
        }
        if self.is_on_demand() {
            return match (self.qualifier(), qualified.rsplit_once('.')) {
                (Some(package), Some((owner, _))) => package == owner,
                _ => false,
            };
        }
        self.qualified_name == qualified
    }
}

fn simple_name_of(qualified: &str) -> &str {
    qualified
        .rsplit_once('.')
        .map_or(qualified, |(_, simple)| simple)
}

impl std::fmt::Display for Import<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_static {
            write!(f, "import static {};", self.qualified_name)
        } else {
            write!(f, "import {};", self.qualified_name)
        }
    }
}

/// Read-only view over the imports visible during a traversal.
///
/// # Example
///
/// ```rust
/// use treewalk_ast::{Import, Imports};
///
/// let decls = [Import::new("java.util.*"), Import::new_static("java.lang.Math.max")];
/// let imports = Imports::new(&decls);
///
/// assert!(imports.is_type_imported("java.util.List"));
/// assert!(!imports.is_type_imported("java.util.logging.Logger"));
/// assert!(imports.static_member("max").is_some());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Imports<'i, 'a> {
    decls: &'i [Import<'a>],
}

impl<'i, 'a> Imports<'i, 'a> {
    /// Wraps a list of import declarations.
    pub const fn new(decls: &'i [Import<'a>]) -> Self {
        Self { decls }
    }

    /// Returns the underlying declarations.
    pub const fn as_slice(&self) -> &'i [Import<'a>] {
        self.decls
    }

    /// Returns true if `qualified` is imported explicitly or on demand and
    /// its simple name is not taken by another single-type import.
    pub fn is_type_imported(&self, qualified: &str) -> bool {
        !self.is_shadowed(qualified)
            && self.decls.iter().any(|decl| decl.imports_type(qualified))
    }

    /// Returns true if a single-type import brings a different type with the
    /// same simple name as `qualified` into scope. Such an import wins over
    /// on-demand imports, `java.lang` and the current package.
    pub fn is_shadowed(&self, qualified: &str) -> bool {
        let simple = simple_name_of(qualified);
        self.decls.iter().any(|decl| {
            !decl.is_static
                && !decl.is_on_demand()
                && decl.simple_name() == simple
                && decl.qualified_name != qualified
        })
    }

    /// Finds the single-type import whose simple name is `simple`.
    pub fn resolve_type(&self, simple: &str) -> Option<&'i Import<'a>> {
        self.decls
            .iter()
            .find(|decl| !decl.is_static && !decl.is_on_demand() && decl.simple_name() == simple)
    }

    /// Finds the static import that brings `member` into scope. Explicit
    /// member imports win over on-demand ones.
    pub fn static_member(&self, member: &str) -> Option<&'i Import<'a>> {
        let mut statics = self.decls.iter().filter(|decl| decl.is_static);
        statics
            .clone()
            .find(|decl| decl.simple_name() == member)
            .or_else(|| statics.find(|decl| decl.is_on_demand()))
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// One source file: package, imports and top-level type declarations.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompilationUnit<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<&'a str>,
    pub imports: &'a [Import<'a>],
    /// Top-level declarations; normally `Class` nodes.
    pub type_decls: NodeList<'a>,
}

impl<'a> CompilationUnit<'a> {
    pub const fn new(
        package_name: Option<&'a str>,
        imports: &'a [Import<'a>],
        type_decls: NodeList<'a>,
    ) -> Self {
        Self {
            package_name,
            imports,
            type_decls,
        }
    }

    pub const fn imports(&self) -> Imports<'a, 'a> {
        Imports::new(self.imports)
    }

    /// Returns true if code in this unit can name `qualified` by its simple
    /// name: imported, declared in the same package, or in `java.lang`.
    ///
    /// A top-level class of this unit or a single-type import with the same
    /// simple name but another qualified name hides `qualified`.
    pub fn can_use_simple_name(&self, qualified: &str) -> bool {
        let owner = qualified.rsplit_once('.').map(|(owner, _)| owner);
        let imports = self.imports();
        if imports.is_shadowed(qualified) {
            return false;
        }
        if self.find_class(simple_name_of(qualified)).is_some() {
            return owner == self.package_name;
        }
        owner == Some("java.lang")
            || (owner.is_some() && owner == self.package_name)
            || imports.is_type_imported(qualified)
    }

    /// Finds a top-level class by name.
    pub fn find_class(&self, name: &str) -> Option<&'a crate::JavaNode<'a>> {
        self.type_decls
            .iter()
            .copied()
            .find(|decl| decl.kind() == NodeKind::Class && decl.name() == Some(name))
    }
}
