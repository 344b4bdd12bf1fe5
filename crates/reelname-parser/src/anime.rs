//! Keyword heuristic for anime titles.
//!
//! A hit only moves the anime providers to the front of the resolution
//! chain; a miss still reaches the general providers. False negatives are
//! expected.

/// Keywords that mark a series as anime.
const TV_KEYWORDS: &[&str] = &[
    "anime",
    "naruto",
    "boruto",
    "one piece",
    "bleach",
    "dragon ball",
    "attack on titan",
    "shingeki no kyojin",
    "demon slayer",
    "kimetsu no yaiba",
    "my hero academia",
    "boku no hero",
    "jujutsu kaisen",
    "fullmetal alchemist",
    "death note",
    "hunter x hunter",
    "sword art online",
    "one punch man",
    "fairy tail",
    "gintama",
    "evangelion",
    "cowboy bebop",
    "spy x family",
    "chainsaw man",
    "mob psycho",
    "tokyo ghoul",
    "haikyuu",
    "sailor moon",
    "pokemon",
    "digimon",
    "yu-gi-oh",
    "jojo",
    "code geass",
    "steins;gate",
    "re:zero",
    "frieren",
];

/// Keywords that mark a film as anime.
const MOVIE_KEYWORDS: &[&str] = &[
    "anime",
    "ghibli",
    "spirited away",
    "sen to chihiro",
    "your name",
    "kimi no na wa",
    "akira",
    "princess mononoke",
    "mononoke hime",
    "totoro",
    "howl's moving castle",
    "weathering with you",
    "tenki no ko",
    "suzume",
    "a silent voice",
    "koe no katachi",
    "perfect blue",
    "paprika",
    "ghost in the shell",
    "evangelion",
    "dragon ball",
    "naruto",
    "one piece",
    "demon slayer",
    "jujutsu kaisen",
];

/// Case-insensitive substring matcher over a fixed keyword list.
#[derive(Debug, Clone, Copy)]
pub struct AnimeClassifier {
    keywords: &'static [&'static str],
}

impl AnimeClassifier {
    /// Classifier for series titles.
    pub const TV: AnimeClassifier = AnimeClassifier {
        keywords: TV_KEYWORDS,
    };

    /// Classifier for film titles.
    pub const MOVIE: AnimeClassifier = AnimeClassifier {
        keywords: MOVIE_KEYWORDS,
    };

    /// Whether any keyword occurs in `title`.
    ///
    /// ```
    /// use reelname_parser::AnimeClassifier;
    ///
    /// assert!(AnimeClassifier::TV.is_anime("Naruto Shippuden"));
    /// assert!(!AnimeClassifier::TV.is_anime("Breaking Bad"));
    /// assert!(AnimeClassifier::MOVIE.is_anime("Spirited Away"));
    /// ```
    pub fn is_anime(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.keywords.iter().any(|kw| lower.contains(kw))
    }

    /// The keyword list this classifier matches against.
    pub fn keywords(&self) -> &'static [&'static str] {
        self.keywords
    }
}
