//! Programming language definitions, detection and rule tables.
//!
//! Everything language-specific the code adapter needs lives here as data:
//! import syntax, the separator hierarchy and block classification rules.
//! Supporting a new language means adding a table, not control flow.

use std::path::Path;

use crate::chunkers::Separator;

/// Languages the code adapter has rule tables for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Go,
    Java,
    Cpp,
}

impl Language {
    /// Get the language from a tag such as "python" or "rs".
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "javascript" | "js" | "jsx" | "node" => Some(Language::JavaScript),
            "typescript" | "ts" | "tsx" => Some(Language::TypeScript),
            "rust" | "rs" => Some(Language::Rust),
            "go" | "golang" => Some(Language::Go),
            "java" => Some(Language::Java),
            "cpp" | "c++" | "cxx" | "cc" | "c" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// Detect the language from a file path's extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let extension = Path::new(path).extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "py" | "pyi" | "pyw" => Some(Language::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "rs" => Some(Language::Rust),
            "go" => Some(Language::Go),
            "java" => Some(Language::Java),
            "c" | "h" | "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// Detect the language from a shebang line.
    pub fn from_shebang(content: &str) -> Option<Self> {
        let first_line = content.lines().next()?;
        if !first_line.starts_with("#!") {
            return None;
        }
        let lower = first_line.to_lowercase();
        if lower.contains("python") {
            Some(Language::Python)
        } else if lower.contains("node") || lower.contains("deno") {
            Some(Language::JavaScript)
        } else {
            None
        }
    }

    /// Get a string representation of the language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    /// The rule table for this language.
    pub fn rules(&self) -> &'static LanguageRules {
        match self {
            Language::Python => &PYTHON,
            Language::JavaScript => &JAVASCRIPT,
            Language::TypeScript => &TYPESCRIPT,
            Language::Rust => &RUST,
            Language::Go => &GO,
            Language::Java => &JAVA,
            Language::Cpp => &CPP,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grouped import statement spanning several lines.
#[derive(Debug)]
pub struct ImportGroup {
    /// Matches an import line that leaves the group open
    pub opens: &'static str,
    /// Matches the line that closes the group
    pub closes: &'static str,
}

/// Declarative per-language rules.
#[derive(Debug)]
pub struct LanguageRules {
    /// Line patterns that start an import statement
    pub imports: &'static [&'static str],
    /// Multi-line import forms
    pub import_groups: &'static [ImportGroup],
    /// Line prefixes skipped while scanning the import preamble
    pub comment_prefixes: &'static [&'static str],
    /// Separator hierarchy: class, function, async function, blank line, line
    pub separators: &'static [Separator],
    /// Ordered (label, pattern) classification rules
    pub block_rules: &'static [(&'static str, &'static str)],
}

/// Hierarchy used when function boundaries are not preserved.
pub static LINE_SEPARATORS: &[Separator] = &[
    Separator::literal("\n\n"),
    Separator::literal("\n"),
    Separator::FixedWidth,
];

static PYTHON: LanguageRules = LanguageRules {
    imports: &[r"^import\s+\S", r"^from\s+\S+\s+import\s"],
    import_groups: &[ImportGroup {
        opens: r"\(\s*$",
        closes: r"\)",
    }],
    comment_prefixes: &["#"],
    separators: &[
        Separator::leading("\nclass "),
        Separator::leading("\ndef "),
        Separator::leading("\nasync def "),
        Separator::leading("\n    def "),
        Separator::leading("\n    async def "),
        Separator::literal("\n\n"),
        Separator::literal("\n"),
        Separator::FixedWidth,
    ],
    block_rules: &[
        ("class", r"[ \t]*class\s+\w+"),
        ("async-function", r"[ \t]*async\s+def\s+\w+"),
        ("function", r"[ \t]*def\s+\w+"),
        ("decorator", r"[ \t]*@\w+"),
        ("import", r"(?:import|from)\s+\S+"),
    ],
};

const JS_IMPORTS: &[&str] = &[
    r#"^import[\s{*'"]"#,
    r"^(?:const|let|var)\s+[\w{}\s,]+=\s*require\(",
    r"^export\s+(?:\*|\{[^}]*\})\s*from\s",
];

const JS_IMPORT_GROUPS: &[ImportGroup] = &[ImportGroup {
    opens: r"^import\s+(?:type\s+)?\{[^}]*$",
    closes: r"\}\s*from\s",
}];

static JAVASCRIPT: LanguageRules = LanguageRules {
    imports: JS_IMPORTS,
    import_groups: JS_IMPORT_GROUPS,
    comment_prefixes: &["//", "/*", "*", "'use strict'", "\"use strict\""],
    separators: &[
        Separator::leading("\nclass "),
        Separator::leading("\nexport class "),
        Separator::leading("\nexport default class "),
        Separator::leading("\nfunction "),
        Separator::leading("\nexport function "),
        Separator::leading("\nexport default function "),
        Separator::leading("\nasync function "),
        Separator::leading("\nexport async function "),
        Separator::leading("\nconst "),
        Separator::literal("\n\n"),
        Separator::literal("\n"),
        Separator::FixedWidth,
    ],
    block_rules: &[
        ("class", r"(?:export\s+(?:default\s+)?)?class\s+\w+"),
        ("async-function", r"(?:export\s+(?:default\s+)?)?async\s+function\b"),
        ("function", r"(?:export\s+(?:default\s+)?)?function\b"),
        (
            "arrow-function",
            r"(?:export\s+)?(?:const|let|var)\s+\w+\s*=\s*(?:async\s*)?(?:\([^)]*\)|\w+)\s*=>",
        ),
        ("import", r"import\b"),
    ],
};

static TYPESCRIPT: LanguageRules = LanguageRules {
    imports: JS_IMPORTS,
    import_groups: JS_IMPORT_GROUPS,
    comment_prefixes: &["//", "/*", "*"],
    separators: &[
        Separator::leading("\nclass "),
        Separator::leading("\nexport class "),
        Separator::leading("\nexport abstract class "),
        Separator::leading("\ninterface "),
        Separator::leading("\nexport interface "),
        Separator::leading("\nfunction "),
        Separator::leading("\nexport function "),
        Separator::leading("\nasync function "),
        Separator::leading("\nexport async function "),
        Separator::leading("\nconst "),
        Separator::leading("\nexport const "),
        Separator::literal("\n\n"),
        Separator::literal("\n"),
        Separator::FixedWidth,
    ],
    block_rules: &[
        ("class", r"(?:export\s+(?:default\s+)?)?(?:abstract\s+)?class\s+\w+"),
        ("interface", r"(?:export\s+)?interface\s+\w+"),
        ("enum", r"(?:export\s+)?(?:const\s+)?enum\s+\w+"),
        ("type", r"(?:export\s+)?type\s+\w+"),
        ("async-function", r"(?:export\s+(?:default\s+)?)?async\s+function\b"),
        ("function", r"(?:export\s+(?:default\s+)?)?function\b"),
        (
            "arrow-function",
            r"(?:export\s+)?(?:const|let)\s+\w+(?:\s*:\s*[^=]+)?\s*=\s*(?:async\s*)?\([^)]*\)[^=]*=>",
        ),
        ("import", r"import\b"),
    ],
};

static RUST: LanguageRules = LanguageRules {
    imports: &[
        r"^(?:pub(?:\([^)]*\))?\s+)?use\s",
        r"^extern\s+crate\s",
        r"^(?:pub(?:\([^)]*\))?\s+)?mod\s+\w+\s*;",
    ],
    import_groups: &[ImportGroup {
        opens: r"\{[^}]*$",
        closes: r"\}\s*;",
    }],
    comment_prefixes: &["//", "/*", "*", "#!["],
    separators: &[
        Separator::leading("\nimpl "),
        Separator::leading("\nimpl<"),
        Separator::leading("\npub struct "),
        Separator::leading("\nstruct "),
        Separator::leading("\npub enum "),
        Separator::leading("\nenum "),
        Separator::leading("\npub trait "),
        Separator::leading("\ntrait "),
        Separator::leading("\npub fn "),
        Separator::leading("\nfn "),
        Separator::leading("\npub async fn "),
        Separator::leading("\nasync fn "),
        Separator::leading("\n    pub fn "),
        Separator::leading("\n    fn "),
        Separator::literal("\n\n"),
        Separator::literal("\n"),
        Separator::FixedWidth,
    ],
    block_rules: &[
        ("impl", r"[ \t]*impl\b"),
        ("struct", r"(?:pub(?:\([^)]*\))?\s+)?struct\s+\w+"),
        ("enum", r"(?:pub(?:\([^)]*\))?\s+)?enum\s+\w+"),
        ("trait", r"(?:pub(?:\([^)]*\))?\s+)?trait\s+\w+"),
        ("async-function", r"[ \t]*(?:pub(?:\([^)]*\))?\s+)?async\s+fn\s+\w+"),
        ("function", r"[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+|unsafe\s+)?fn\s+\w+"),
        ("attribute", r"[ \t]*#\["),
        ("import", r"(?:pub\s+)?use\s"),
    ],
};

static GO: LanguageRules = LanguageRules {
    imports: &[r"^package\s+\w+", r"^import\s"],
    import_groups: &[ImportGroup {
        opens: r"^import\s*\(\s*$",
        closes: r"^\s*\)",
    }],
    comment_prefixes: &["//", "/*", "*"],
    separators: &[
        Separator::leading("\ntype "),
        Separator::leading("\nfunc ("),
        Separator::leading("\nfunc "),
        Separator::literal("\n\n"),
        Separator::literal("\n"),
        Separator::FixedWidth,
    ],
    block_rules: &[
        ("struct", r"type\s+\w+\s+struct\b"),
        ("interface", r"type\s+\w+\s+interface\b"),
        ("type", r"type\s+\w+"),
        ("method", r"func\s*\("),
        ("function", r"func\s+\w+"),
        ("import", r"(?:import|package)\b"),
    ],
};

static JAVA: LanguageRules = LanguageRules {
    imports: &[r"^import\s", r"^package\s"],
    import_groups: &[],
    comment_prefixes: &["//", "/*", "*"],
    separators: &[
        Separator::leading("\npublic class "),
        Separator::leading("\nclass "),
        Separator::leading("\npublic interface "),
        Separator::leading("\ninterface "),
        Separator::leading("\n    public "),
        Separator::leading("\n    protected "),
        Separator::leading("\n    private "),
        Separator::literal("\n\n"),
        Separator::literal("\n"),
        Separator::FixedWidth,
    ],
    block_rules: &[
        (
            "class",
            r"[ \t]*(?:(?:public|protected|private|abstract|final|static)\s+)*class\s+\w+",
        ),
        ("interface", r"[ \t]*(?:public\s+)?interface\s+\w+"),
        ("enum", r"[ \t]*(?:public\s+)?enum\s+\w+"),
        (
            "method",
            r"[ \t]*(?:(?:public|protected|private|static|final|abstract|synchronized)\s+)+[\w<>\[\], ]+\s+\w+\s*\(",
        ),
        ("import", r"(?:import|package)\s"),
    ],
};

static CPP: LanguageRules = LanguageRules {
    imports: &[r"^#\s*include\s", r"^using\s+namespace\s", r"^#\s*pragma\s+once"],
    import_groups: &[],
    comment_prefixes: &["//", "/*", "*"],
    separators: &[
        Separator::leading("\nclass "),
        Separator::leading("\nstruct "),
        Separator::leading("\nnamespace "),
        Separator::leading("\ntemplate"),
        Separator::literal("\n\n"),
        Separator::literal("\n"),
        Separator::FixedWidth,
    ],
    block_rules: &[
        ("class", r"(?:template\s*<[^>]*>\s*)?class\s+\w+"),
        ("struct", r"(?:typedef\s+)?struct\b"),
        ("namespace", r"namespace\b"),
        (
            "function",
            r"(?:(?:static|inline|virtual|extern)\s+)*[\w:<>]+[\s\*&]+\w+(?:::\w+)*\s*\([^;{]*\)\s*(?:const\s*)?\{",
        ),
        ("include", r"#\s*include"),
    ],
};
