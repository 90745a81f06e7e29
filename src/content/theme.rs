//! Built-in theme catalog and random selection.

use rand::seq::SliceRandom;

/// A visual/poetic theme a greeting is generated around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Unique display name; also the value carried in share links.
    pub name: &'static str,
    /// Scene description fed to the image model.
    pub prompt: &'static str,
    /// Presentation hint (background gradient) for the result card.
    pub display_hint: &'static str,
}

/// Display hint used when a shared theme name is not in the catalog.
pub const NEUTRAL_DISPLAY_HINT: &str = "from-gray-900 to-black";

/// The static theme catalog.
pub const THEMES: &[Theme] = &[
    Theme {
        name: "Victorian Christmas",
        prompt: "A classic Charles Dickens style Victorian Christmas scene, snowy London streets, gas lamps, festive warmth",
        display_hint: "from-amber-900 to-red-900",
    },
    Theme {
        name: "Cyberpunk 2025",
        prompt: "Futuristic Cyberpunk Christmas 2025, neon lights, holograms of reindeer, high-tech Santa sleigh, snowy cyberpunk city",
        display_hint: "from-blue-900 to-purple-900",
    },
    Theme {
        name: "Cozy Cabin",
        prompt: "Inside a rustic log cabin, crackling fireplace, huge decorated tree, hot cocoa, very cozy and warm atmosphere",
        display_hint: "from-orange-800 to-brown-900",
    },
    Theme {
        name: "Galactic Holiday",
        prompt: "Christmas on a space station, earth in background, zero gravity ornaments, astronaut Santa, stars and nebulas",
        display_hint: "from-slate-900 to-indigo-900",
    },
    Theme {
        name: "Candy Cane Land",
        prompt: "A magical world made of candy, gingerbread houses, peppermint trees, chocolate river, bright and colorful",
        display_hint: "from-pink-600 to-red-600",
    },
    Theme {
        name: "Steampunk North Pole",
        prompt: "Steampunk style Santa workshop, brass gears, steam powered sleigh, elves with goggles, vintage mechanics",
        display_hint: "from-stone-800 to-amber-700",
    },
    Theme {
        name: "Tropical Christmas",
        prompt: "Christmas on a tropical beach, palm trees with lights, snowman made of sand, sunset over ocean, relaxed vibe",
        display_hint: "from-teal-700 to-cyan-600",
    },
    Theme {
        name: "Anime Winter",
        prompt: "High quality anime style Christmas illustration, beautiful snowy background, cute characters, magical lighting, Studio Ghibli vibes",
        display_hint: "from-blue-500 to-indigo-600",
    },
    Theme {
        name: "Fantasy Forest",
        prompt: "Enchanted winter forest, glowing mythical creatures, fairies decorating trees, mystical snow, ethereal atmosphere",
        display_hint: "from-emerald-900 to-teal-900",
    },
    Theme {
        name: "8-Bit Retro",
        prompt: "Pixel art style Christmas scene, retro video game aesthetic, snowy village, vibrant colors",
        display_hint: "from-indigo-800 to-purple-800",
    },
];

/// Pick a theme uniformly at random from [`THEMES`].
pub fn random_theme() -> Theme {
    let mut rng = rand::thread_rng();
    // THEMES is a non-empty constant.
    *THEMES.choose(&mut rng).unwrap_or(&THEMES[0])
}

/// Look a theme up by its exact name.
pub fn find_theme(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.name == name)
}

/// Display hint for `name`, or [`NEUTRAL_DISPLAY_HINT`] for unknown themes.
pub fn display_hint_for(name: &str) -> &'static str {
    find_theme(name)
        .map(|t| t.display_hint)
        .unwrap_or(NEUTRAL_DISPLAY_HINT)
}
