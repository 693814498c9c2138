use smol_str::SmolStr;

/// Lower-cases every character.
#[inline(always)]
pub fn lower_case(s: &str) -> SmolStr {
    s.chars()
        .map(|c| c.to_lowercase().collect::<String>())
        .collect::<SmolStr>()
}

/// Upper-cases every character.
#[inline(always)]
pub fn upper_case(s: &str) -> SmolStr {
    s.chars()
        .map(|c| c.to_uppercase().collect::<String>())
        .collect::<SmolStr>()
}

/// Upper-cases the first character only.
#[inline(always)]
pub fn upper_first(s: &str) -> SmolStr {
    let mut c = s.chars();
    match c.next() {
        None => SmolStr::new(""),
        Some(f) => SmolStr::from(f.to_uppercase().collect::<String>() + c.as_str()),
    }
}

/// Has at least one cased letter and no lower-case ones.
pub fn is_all_caps(word: &str) -> bool {
    word.chars().any(|c| c.is_uppercase()) && !word.chars().any(|c| c.is_lowercase())
}

/// Starts with an upper-case letter.
pub fn is_first_caps(word: &str) -> bool {
    word.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

/// How suggestions are re-cased to match the token the user typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMutation {
    /// Capitalize
    FirstCaps,
    /// Upper-case everything
    AllCaps,
    /// Leave as is
    None,
}

impl CaseMutation {
    /// Decided from the original token, never from its normalized form.
    /// Single-letter tokens are capitalized rather than upper-cased.
    pub fn of(original: &str) -> CaseMutation {
        let original = original.trim();

        if original.chars().nth(1).is_some() && is_all_caps(original) {
            CaseMutation::AllCaps
        } else if is_first_caps(original) {
            CaseMutation::FirstCaps
        } else {
            CaseMutation::None
        }
    }

    /// Re-cases `word` accordingly.
    pub fn apply(&self, word: &str) -> SmolStr {
        match self {
            CaseMutation::FirstCaps => upper_first(word),
            CaseMutation::AllCaps => upper_case(word),
            CaseMutation::None => SmolStr::new(word),
        }
    }
}
