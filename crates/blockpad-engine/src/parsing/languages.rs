/// A code-fence language and the tags that name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
}

impl Language {
    pub fn new(id: &str, name: &str, aliases: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn answers_to(&self, tag: &str) -> bool {
        self.id.eq_ignore_ascii_case(tag)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(tag))
    }
}

/// Known code-block languages, constructed once and passed by value to
/// whatever needs to resolve fence tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
}

impl LanguageRegistry {
    pub fn new(languages: Vec<Language>) -> Self {
        Self { languages }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Language::new("plaintext", "Plain Text", &["text", "txt"]),
            Language::new("rust", "Rust", &["rs"]),
            Language::new("javascript", "JavaScript", &["js"]),
            Language::new("typescript", "TypeScript", &["ts"]),
            Language::new("python", "Python", &["py"]),
            Language::new("shell", "Shell", &["sh", "bash", "zsh"]),
            Language::new("json", "JSON", &[]),
            Language::new("toml", "TOML", &[]),
            Language::new("yaml", "YAML", &["yml"]),
            Language::new("markdown", "Markdown", &["md"]),
            Language::new("html", "HTML", &[]),
            Language::new("css", "CSS", &[]),
            Language::new("sql", "SQL", &[]),
            Language::new("go", "Go", &["golang"]),
            Language::new("java", "Java", &[]),
            Language::new("c", "C", &[]),
            Language::new("cpp", "C++", &["c++"]),
            Language::new("latex", "LaTeX", &["tex"]),
        ])
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Language named by `tag` (id or alias, ASCII case-insensitive).
    pub fn resolve(&self, tag: &str) -> Option<&Language> {
        let tag = tag.trim();
        self.languages.iter().find(|l| l.answers_to(tag))
    }

    /// Canonical id for a fence tag; unknown tags are kept as written.
    pub fn canonical_tag(&self, tag: &str) -> String {
        match self.resolve(tag) {
            Some(language) => language.id.clone(),
            None => tag.trim().to_string(),
        }
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
