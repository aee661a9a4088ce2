use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use sangkamp_core::error::Result;
use sangkamp_core::{
    ContentProvider, CoreError, Difficulty, GeminiConfig, PlaylistQuery, Song,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for HTTP requests. Playlist generation is a slow
/// model call, so this is far above a normal API timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default number of retry attempts
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Google Gemini content provider
pub struct GeminiProvider {
    client: ClientWithMiddleware,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider with default timeout and 3 retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let base_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("Sangkamp/1.0 (https://github.com/sangkamp/sangkamp)")
            .build()?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(DEFAULT_MAX_RETRIES);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, config })
    }

    /// Run one generateContent call and return the first candidate's text.
    async fn generate(&self, model: &str, prompt: String, json_response: bool) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: json_response.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };

        info!("Gemini POST generateContent (model: {})", model);
        let response = self.client.post(&url).json(&request).send().await?;
        debug!("Gemini response status: {}", response.status());

        if !response.status().is_success() {
            warn!("Gemini returned status: {}", response.status());
            return Err(CoreError::ProviderFailed {
                provider: self.name().to_string(),
                reason: format!("Gemini returned status: {}", response.status()),
            });
        }

        let result: GenerateResponse = response.json().await?;
        first_text(&result).ok_or_else(|| CoreError::ProviderFailed {
            provider: self.name().to_string(),
            reason: "Gemini response contained no text".to_string(),
        })
    }
}

/// Request body for the generateContent endpoint
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Response from the generateContent endpoint.
/// Note: the API returns additional fields (usage, safety ratings) that we
/// don't use; serde ignores unknown fields by default.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

fn first_text(response: &GenerateResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// One song as the model emits it; ids are assigned locally.
#[derive(Debug, Deserialize)]
struct SongPayload {
    title: String,
    artist: String,
    year: i32,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    fact: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default, rename = "mediaRef")]
    media_ref: Option<String>,
}

fn random_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect()
}

/// Strip a markdown code fence the model sometimes wraps JSON output in.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse the playlist text into songs. A malformed payload yields an empty
/// playlist rather than an error; the caller decides whether to refuse it.
fn parse_playlist(text: &str) -> Vec<Song> {
    let payload = strip_code_fence(text);
    match serde_json::from_str::<Vec<SongPayload>>(payload) {
        Ok(songs) => songs
            .into_iter()
            .map(|s| {
                let mut song = Song::new(random_id(), s.title, s.artist, s.year)
                    .with_genre(s.genre)
                    .with_fact(s.fact)
                    .with_difficulty(s.difficulty);
                if let Some(media_ref) = s.media_ref {
                    song = song.with_media_ref(media_ref);
                }
                song
            })
            .collect(),
        Err(e) => {
            warn!("Gemini playlist payload is not valid JSON: {}", e);
            Vec::new()
        }
    }
}

fn build_playlist_prompt(query: &PlaylistQuery) -> String {
    let decade = if query.any_decade() {
        "blandet fra alle årtier mellem 1950 og 2024".to_string()
    } else {
        format!("fra {}", query.decade)
    };
    let genre = if query.any_genre() {
        "populære hits på tværs af genrer".to_string()
    } else {
        format!("inden for genren {}", query.genre)
    };
    let difficulty = match query.difficulty {
        Difficulty::Easy => "meget kendte sange, som de fleste kan nynne med på",
        Difficulty::Medium => "en blanding af store hits og lidt mindre kendte sange",
        Difficulty::Hard => "mere obskure sange for de rigtige musiknørder",
    };

    let mut prompt = format!(
        "Du er vært for en musikquiz, hvor hold skal gætte hvilket år en sang udkom. \
         Lav en spilleliste med {} sange {decade}, {genre}. \
         Sværhedsgrad: {difficulty}. Ingen sang eller kunstner må gå igen.",
        query.count
    );
    if let Some(theme) = &query.custom_category {
        prompt.push_str(&format!(" Alle sange skal passe til temaet: {theme}."));
    }
    prompt.push_str(
        " Svar kun med et JSON-array, hvor hvert element har felterne \
         \"title\", \"artist\", \"year\", \"genre\", \"fact\" og \"difficulty\" \
         (\"easy\", \"medium\" eller \"hard\"). \"year\" er det oprindelige \
         udgivelsesår som et heltal, og \"fact\" er en kort sjov fakta om \
         sangen på dansk.",
    );
    prompt
}

fn build_trivia_prompt(year: i32) -> String {
    format!(
        "Fortæl én kort og overraskende fakta om året {year} på dansk. \
         Højst to sætninger, uden indledning."
    )
}

fn build_category_prompt(category: &str) -> String {
    format!(
        "En musikquiz-vært har valgt temaet \"{category}\" til en spilleliste. \
         Bekræft med én kort sætning på dansk, at du kan finde sange til temaet, \
         eller forklar kort hvorfor temaet er for smalt."
    )
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_playlist(&self, query: &PlaylistQuery) -> Result<Vec<Song>> {
        info!(
            "Generating playlist of {} songs (decade: {}, genre: {}, difficulty: {}, theme: {:?})",
            query.count, query.decade, query.genre, query.difficulty, query.custom_category
        );

        let prompt = build_playlist_prompt(query);
        let text = self
            .generate(&self.config.playlist_model, prompt, true)
            .await?;
        let songs = parse_playlist(&text);
        info!("Gemini returned {} songs", songs.len());
        Ok(songs)
    }

    async fn trivia_for_year(&self, year: i32) -> Result<String> {
        let text = self
            .generate(&self.config.trivia_model, build_trivia_prompt(year), false)
            .await?;
        Ok(text.trim().to_string())
    }

    async fn validate_custom_category(&self, category: &str) -> Result<String> {
        let text = self
            .generate(
                &self.config.trivia_model,
                build_category_prompt(category),
                false,
            )
            .await?;
        Ok(text.trim().to_string())
    }
}
