//! Death message keywords.

/// Substrings found in vanilla death messages.
pub const BUILTIN_DEATH_KEYWORDS: &[&str] = &[
    "shot",
    "pricked",
    "walked into a cactus",
    "roasted",
    "drowned",
    "kinetic",
    "blew up",
    "blown up",
    "killed",
    "hit the ground",
    "fell",
    "doomed",
    "squashed",
    "magic",
    "flames",
    "burned",
    "walked into fire",
    "burnt",
    "bang",
    "lava",
    "lightning",
    "danger",
    "slain",
    "fireballed",
    "stung",
    "starved",
    "suffocated",
    "squished",
    "poked",
    "impaled",
    "didn't want to live",
    "withered",
    "pummeled",
    "died",
];

/// Ordered, duplicate-free set of death keywords.
///
/// Built-in keywords come first, followed by custom ones in the order they
/// were given. A repeated keyword keeps its first position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Built-in keywords plus `custom`. Empty custom entries are dropped,
    /// since an empty substring would match every line.
    pub fn new<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = Vec::with_capacity(BUILTIN_DEATH_KEYWORDS.len());

        let builtin = BUILTIN_DEATH_KEYWORDS.iter().map(|k| k.to_string());
        let custom = custom
            .into_iter()
            .map(|k| k.as_ref().to_string())
            .filter(|k| !k.is_empty());

        for keyword in builtin.chain(custom) {
            if !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }

        Self { keywords }
    }

    pub fn builtin() -> Self {
        Self::new(std::iter::empty::<&str>())
    }

    /// First keyword contained in `text`, if any.
    pub fn find_in(&self, text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|keyword| text.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::builtin()
    }
}
