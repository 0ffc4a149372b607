use std::sync::Arc;

use fitbrief_core::{
    DifficultyTier, Exercise, IntensityTier, Pipeline, Provider, Settings, VideoSummary,
};
use iced::widget::{Column, button, column, row, scrollable, text, text_input};
use iced::{Color, Element, Task};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const ERROR_RED: Color = Color::from_rgb(0.97, 0.44, 0.44);
const GREEN: Color = Color::from_rgb(0.29, 0.87, 0.5);
const YELLOW: Color = Color::from_rgb(0.98, 0.8, 0.08);
const MUTED: Color = Color::from_rgb(0.6, 0.6, 0.6);

fn main() -> iced::Result {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    iced::application(App::new, App::update, App::view)
        .title("Fitbrief")
        .run()
}

struct App {
    pipeline: Arc<Pipeline>,
    url: String,
    /// Bumped on every submission; results from older submissions are dropped.
    generation: u64,
    loading: bool,
    error: Option<String>,
    summary: Option<VideoSummary>,
}

#[derive(Debug, Clone)]
enum Message {
    UrlChanged(String),
    Submit,
    Analyzed(u64, Result<VideoSummary, String>),
    DismissError,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::from_env(Provider::default());
        for var in settings.missing_keys() {
            tracing::warn!("{} is not set", var);
        }
        (Self::with_pipeline(Pipeline::from_settings(&settings)), Task::none())
    }

    fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            url: String::new(),
            generation: 0,
            loading: false,
            error: None,
            summary: None,
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::UrlChanged(url) => self.url = url,
            Message::Submit => {
                if self.url.trim().is_empty() {
                    return Task::none();
                }
                self.generation += 1;
                self.loading = true;
                self.error = None;
                self.summary = None;

                let generation = self.generation;
                let pipeline = Arc::clone(&self.pipeline);
                let url = self.url.clone();
                return Task::perform(
                    async move {
                        pipeline
                            .summarize(&url)
                            .await
                            .map_err(|e| e.user_message())
                    },
                    move |result| Message::Analyzed(generation, result),
                );
            }
            Message::Analyzed(generation, result) => {
                if generation != self.generation {
                    tracing::debug!(generation, current = self.generation, "dropping stale result");
                    return Task::none();
                }
                self.loading = false;
                match result {
                    Ok(summary) => self.summary = Some(summary),
                    Err(message) => self.error = Some(message),
                }
            }
            Message::DismissError => self.error = None,
        }
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let mut content = column![
            text("Fitbrief").size(32),
            text("Turn any fitness video into a structured workout plan.")
                .size(16)
                .color(MUTED),
        ]
        .padding(24)
        .spacing(16);

        if let Some(error) = &self.error {
            content = content.push(
                row![
                    text(error.as_str()).color(ERROR_RED),
                    button(text("×")).on_press(Message::DismissError),
                ]
                .spacing(12),
            );
        }

        let analyze = button(text(if self.loading { "Analyzing" } else { "Analyze" }))
            .on_press_maybe((!self.loading).then_some(Message::Submit));
        content = content.push(
            row![
                text_input("Paste YouTube fitness video URL here...", &self.url)
                    .on_input(Message::UrlChanged)
                    .on_submit(Message::Submit)
                    .padding(10),
                analyze,
            ]
            .spacing(10),
        );

        if self.loading {
            content = content.push(text("Analyzing workout content...").color(MUTED));
        } else if let Some(summary) = &self.summary {
            content = content.push(summary_view(summary));
        }

        scrollable(content).into()
    }
}

fn difficulty_color(difficulty: &str) -> Color {
    match DifficultyTier::classify(difficulty) {
        DifficultyTier::Beginner => GREEN,
        DifficultyTier::Intermediate => YELLOW,
        DifficultyTier::Advanced => ERROR_RED,
    }
}

fn intensity_color(intensity: &str) -> Color {
    match IntensityTier::classify(intensity) {
        IntensityTier::High => ERROR_RED,
        IntensityTier::Medium => YELLOW,
        IntensityTier::Low => GREEN,
        IntensityTier::Other => MUTED,
    }
}

fn summary_view(summary: &VideoSummary) -> Element<'_, Message> {
    let mut body = column![
        row![
            text(summary.difficulty.as_str()).color(difficulty_color(&summary.difficulty)),
            text(summary.workout_type.as_str()),
        ]
        .spacing(12),
        text(summary.title.as_str()).size(24),
        text(format!(
            "{}  ·  {}  ·  {} views  ·  {} likes  ·  {}",
            summary.channel_name,
            summary.duration,
            summary.views,
            summary.likes,
            summary.estimated_calories
        ))
        .color(MUTED),
    ]
    .spacing(8);

    if !summary.equipment.is_empty() {
        body = body.push(text(format!("Equipment: {}", summary.equipment.join(", "))));
    }
    if !summary.target_muscles.is_empty() {
        body = body.push(text(format!(
            "Target muscles: {}",
            summary.target_muscles.join(", ")
        )));
    }

    body = body.push(text("Exercises").size(20));
    body.push(Column::with_children(
        summary
            .exercises
            .iter()
            .enumerate()
            .map(|(i, exercise)| exercise_view(i + 1, exercise)),
    ))
    .into()
}

fn exercise_view(position: usize, exercise: &Exercise) -> Element<'_, Message> {
    let mut card = column![
        row![
            text(format!("{}. {}", position, exercise.name)).size(18),
            text(exercise.intensity.as_str()).color(intensity_color(&exercise.intensity)),
        ]
        .spacing(12),
        text(format!(
            "{} sets × {} reps  ·  Rest {}",
            exercise.sets, exercise.reps, exercise.rest_period
        )),
    ]
    .spacing(4)
    .padding(8);

    if let Some(duration) = &exercise.duration {
        card = card.push(text(format!("Duration: {}", duration)).color(MUTED));
    }
    if let Some(rounds) = &exercise.rounds {
        card = card.push(text(format!("Rounds: {}", rounds)).color(MUTED));
    }
    if !exercise.target_muscles.is_empty() {
        card = card.push(
            text(format!("Targets: {}", exercise.target_muscles.join(", "))).color(MUTED),
        );
    }
    if !exercise.notes.is_empty() {
        card = card.push(text(exercise.notes.as_str()));
    }
    card.into()
}
