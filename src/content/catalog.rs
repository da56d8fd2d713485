//! Built-in anime catalog served when the content feed is unavailable.

use super::normalize::Anime;

pub const MOCK_TOP_ANIME_LEN: usize = 5;

struct Entry {
    id: &'static str,
    title: &'static str,
    image: &'static str,
    status: &'static str,
    episodes: u32,
    rating: f64,
    views: u64,
    added_date: &'static str,
}

const CATALOG: [Entry; 10] = [
    Entry {
        id: "aot-final",
        title: "Attack on Titan: Final Season",
        image: "/armored-titan-battle.png",
        status: "Completed",
        episodes: 16,
        rating: 9.8,
        views: 1_250_000,
        added_date: "2022-01-15",
    },
    Entry {
        id: "demon-slayer-entertainment",
        title: "Demon Slayer: Entertainment District Arc",
        image: "/demon-slayer-inspired.png",
        status: "Completed",
        episodes: 11,
        rating: 9.6,
        views: 980_000,
        added_date: "2022-02-20",
    },
    Entry {
        id: "jujutsu-kaisen",
        title: "Jujutsu Kaisen",
        image: "/jujutsu-kaisen-inspired.png",
        status: "Ongoing",
        episodes: 24,
        rating: 9.5,
        views: 870_000,
        added_date: "2021-10-05",
    },
    Entry {
        id: "one-piece-wano",
        title: "One Piece: Wano Arc",
        image: "/grand-line-adventure.png",
        status: "Ongoing",
        episodes: 150,
        rating: 9.4,
        views: 750_000,
        added_date: "2021-07-10",
    },
    Entry {
        id: "chainsaw-man",
        title: "Chainsaw Man",
        image: "/chainsaw-man-inspired.png",
        status: "Ongoing",
        episodes: 12,
        rating: 9.3,
        views: 720_000,
        added_date: "2022-10-12",
    },
    Entry {
        id: "spy-family",
        title: "Spy x Family",
        image: "/spy-x-family-manga-style.png",
        status: "Ongoing",
        episodes: 25,
        rating: 9.1,
        views: 680_000,
        added_date: "2022-04-18",
    },
    Entry {
        id: "my-hero-academia-s6",
        title: "My Hero Academia Season 6",
        image: "/placeholder.svg?key=a9f4h",
        status: "Ongoing",
        episodes: 25,
        rating: 8.9,
        views: 620_000,
        added_date: "2022-10-01",
    },
    Entry {
        id: "bleach-tybw",
        title: "Bleach: Thousand-Year Blood War",
        image: "/placeholder.svg?key=jajdx",
        status: "Ongoing",
        episodes: 13,
        rating: 9.2,
        views: 590_000,
        added_date: "2022-10-10",
    },
    Entry {
        id: "mob-psycho-100-s3",
        title: "Mob Psycho 100 III",
        image: "/placeholder.svg?key=04z0t",
        status: "Completed",
        episodes: 12,
        rating: 9.0,
        views: 540_000,
        added_date: "2022-10-05",
    },
    Entry {
        id: "cyberpunk-edgerunners",
        title: "Cyberpunk: Edgerunners",
        image: "/cyberpunk-cityscape.png",
        status: "Completed",
        episodes: 10,
        rating: 8.8,
        views: 510_000,
        added_date: "2022-09-13",
    },
];

impl Entry {
    fn to_anime(&self) -> Anime {
        Anime {
            id: self.id.to_owned(),
            title: self.title.to_owned(),
            image: self.image.to_owned(),
            status: self.status.to_owned(),
            episodes: Some(self.episodes),
            rating: Some(self.rating),
            views: self.views,
            added_date: Some(self.added_date.to_owned()),
        }
    }
}

/// Full fallback list (10 titles).
#[must_use]
pub fn mock_anime_list() -> Vec<Anime> {
    CATALOG.iter().map(Entry::to_anime).collect()
}

/// Fallback top chart: the five most-viewed catalog titles.
#[must_use]
pub fn mock_top_anime() -> Vec<Anime> {
    CATALOG
        .iter()
        .take(MOCK_TOP_ANIME_LEN)
        .map(Entry::to_anime)
        .collect()
}
