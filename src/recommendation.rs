//! Tiered dietary and lifestyle guidance
//!
//! A cortisol level is sorted into one of three fixed bands, and each band maps
//! to a static guidance record. The mapping is a lookup table; nothing about the
//! guidance depends on the level beyond its tier.

use serde::{Deserialize, Serialize};

/// Levels below this are Low (ng/mL)
pub const LOW_THRESHOLD_NG_ML: f64 = 5.0;

/// Levels above this are High (ng/mL)
pub const HIGH_THRESHOLD_NG_ML: f64 = 18.0;

/// Cortisol band driving guidance selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    Low,
    Normal,
    High,
}

impl RecommendationTier {
    /// Band for `level`. Both boundaries belong to Normal.
    pub fn from_level(level: f64) -> Self {
        if level < LOW_THRESHOLD_NG_ML {
            RecommendationTier::Low
        } else if level > HIGH_THRESHOLD_NG_ML {
            RecommendationTier::High
        } else {
            RecommendationTier::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationTier::Low => "low",
            RecommendationTier::Normal => "normal",
            RecommendationTier::High => "high",
        }
    }

    /// Static guidance for this tier
    pub fn guidance(&self) -> &'static Guidance {
        match self {
            RecommendationTier::Low => &LOW_GUIDANCE,
            RecommendationTier::Normal => &NORMAL_GUIDANCE,
            RecommendationTier::High => &HIGH_GUIDANCE,
        }
    }
}

/// Guidance content for one tier
#[derive(Debug, PartialEq, Eq)]
pub struct Guidance {
    pub status: &'static str,
    pub diet_advice: &'static [&'static str],
    pub foods_to_eat: &'static [&'static str],
    pub foods_to_avoid: &'static [&'static str],
    pub lifestyle_tips: &'static [&'static str],
}

static LOW_GUIDANCE: Guidance = Guidance {
    status: "Low Cortisol",
    diet_advice: &[
        "Eat regular meals and avoid skipping breakfast",
        "Pair complex carbohydrates with protein to keep blood sugar steady",
        "Keep sodium intake adequate unless advised otherwise by a clinician",
    ],
    foods_to_eat: &[
        "Whole grains such as oats and brown rice",
        "Eggs, lean poultry and fish",
        "Avocado, nuts and seeds",
        "Lightly salted broths and soups",
        "Fresh fruit with a protein snack",
    ],
    foods_to_avoid: &[
        "Long fasting windows",
        "Refined sugar on an empty stomach",
        "Excess alcohol",
        "Heavy caffeine late in the day",
    ],
    lifestyle_tips: &[
        "Get morning daylight within an hour of waking",
        "Keep a consistent sleep and wake time",
        "Favour gentle movement such as walking or yoga over exhausting workouts",
        "Talk to a healthcare provider if fatigue or dizziness persist",
    ],
};

static NORMAL_GUIDANCE: Guidance = Guidance {
    status: "Normal",
    diet_advice: &[
        "Maintain a balanced diet with plenty of vegetables, protein and fibre",
        "Keep meal timing regular",
        "Stay hydrated through the day",
    ],
    foods_to_eat: &[
        "Leafy greens and colourful vegetables",
        "Fatty fish such as salmon or sardines",
        "Legumes and whole grains",
        "Berries and citrus fruit",
        "Yogurt and other fermented foods",
    ],
    foods_to_avoid: &[
        "Highly processed snacks",
        "Sugary drinks",
        "Large late-night meals",
    ],
    lifestyle_tips: &[
        "Keep up regular exercise",
        "Aim for seven to nine hours of sleep",
        "Keep short breaks in long work sessions",
        "Continue your current stress management routine",
    ],
};

static HIGH_GUIDANCE: Guidance = Guidance {
    status: "High Cortisol",
    diet_advice: &[
        "Cut back on caffeine, especially after noon",
        "Choose magnesium and vitamin C rich foods",
        "Eat smaller balanced meals instead of large ones",
        "Limit added sugar and refined carbohydrates",
    ],
    foods_to_eat: &[
        "Dark leafy greens such as spinach and kale",
        "Bananas and citrus fruit",
        "Pumpkin seeds, almonds and walnuts",
        "Dark chocolate in small amounts",
        "Herbal teas such as chamomile",
    ],
    foods_to_avoid: &[
        "Coffee and energy drinks",
        "Alcohol",
        "Fried and ultra-processed foods",
        "Sweets and sugary drinks",
    ],
    lifestyle_tips: &[
        "Practise slow breathing or meditation for ten minutes",
        "Take a short walk outdoors",
        "Wind down without screens an hour before bed",
        "Swap intense late workouts for lighter activity",
        "Seek medical advice if levels stay high",
    ],
};

/// Guidance record handed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tier: RecommendationTier,
    pub status: String,
    pub diet_advice: Vec<String>,
    pub foods_to_eat: Vec<String>,
    pub foods_to_avoid: Vec<String>,
    pub lifestyle_tips: Vec<String>,
}

impl Recommendation {
    fn from_guidance(tier: RecommendationTier, guidance: &Guidance) -> Self {
        let owned = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        };
        Self {
            tier,
            status: guidance.status.to_string(),
            diet_advice: owned(guidance.diet_advice),
            foods_to_eat: owned(guidance.foods_to_eat),
            foods_to_avoid: owned(guidance.foods_to_avoid),
            lifestyle_tips: owned(guidance.lifestyle_tips),
        }
    }
}

/// Maps cortisol levels to guidance
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// A level guidance can be given for: finite and not negative
    pub fn is_valid_level(level: f64) -> bool {
        level.is_finite() && level >= 0.0
    }

    pub fn classify(level: f64) -> RecommendationTier {
        RecommendationTier::from_level(level)
    }

    /// Guidance for `level`
    pub fn recommend(level: f64) -> Recommendation {
        let tier = Self::classify(level);
        Recommendation::from_guidance(tier, tier.guidance())
    }
}
