//! Educational video catalog referenced by assistant replies.

/// One playable video in the in-app library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoResource {
    pub id: String,
    pub title: String,
    /// Display duration, e.g. `5:12`.
    pub duration: String,
    /// Hashtag-style category label.
    pub category: String,
    pub thumbnail_url: String,
    pub video_url: String,
    pub description: String,
    pub is_premium: bool,
}

/// Lookup table of videos by id, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoCatalog {
    videos: Vec<VideoResource>,
}

impl VideoCatalog {
    pub fn new(videos: Vec<VideoResource>) -> Self {
        Self { videos }
    }

    /// Library shipped with the app.
    pub fn builtin() -> Self {
        Self::new(vec![
            video(
                "v1",
                "Dicas de Introdução Alimentar 🍎",
                "5:12",
                "#NutriInfantil",
                "J4X5mK5F5w4",
                "Como começar a introdução alimentar de forma segura e saudável. BLW e papinhas explicados na prática.",
                false,
            ),
            video(
                "v2",
                "Adeus Cólica? Massagem Shantala ✨",
                "3:30",
                "#SemChoro",
                "ptXj1jFp_gU",
                "A técnica infalível de massagem que acalma bebês com gases e cólicas. Passo a passo.",
                false,
            ),
            video(
                "v3",
                "Manobra de Desengasgo: Salve uma vida 🚨",
                "2:15",
                "#PrimeirosSocorros",
                "5T5ZZc8KjKQ",
                "Todo pai e mãe PRECISA ver isso. O passo a passo exato do que fazer se o bebê engasgar.",
                true,
            ),
            video(
                "v4",
                "Como fazer o bebê dormir a noite toda 😴",
                "4:10",
                "#SonoDoBebe",
                "hJ3h2vj-wXo",
                "Dicas de higiene do sono e rotina para melhorar a noite de toda a família.",
                true,
            ),
            video(
                "v5",
                "Banho do Recém-Nascido: Passo a Passo 🛁",
                "6:00",
                "#Higiene",
                "_G2eLwz5yK8",
                "Como dar banho no bebê com segurança e tranquilidade, desde a temperatura da água até a limpeza.",
                false,
            ),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&VideoResource> {
        self.videos.iter().find(|video| video.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoResource> {
        self.videos.iter()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

fn video(
    id: &str,
    title: &str,
    duration: &str,
    category: &str,
    youtube_id: &str,
    description: &str,
    is_premium: bool,
) -> VideoResource {
    VideoResource {
        id: id.to_string(),
        title: title.to_string(),
        duration: duration.to_string(),
        category: category.to_string(),
        thumbnail_url: format!("https://img.youtube.com/vi/{youtube_id}/hqdefault.jpg"),
        video_url: format!("https://www.youtube.com/embed/{youtube_id}?autoplay=1&rel=0"),
        description: description.to_string(),
        is_premium,
    }
}
