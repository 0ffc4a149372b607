use crate::types::VideoSummary;

/// Format an ISO-8601 duration (`PT#H#M#S`) as a colon-separated clock.
///
/// Only the components present in the input are emitted, each padded to two
/// digits: `PT1H2M3S` -> `01:02:03`, `PT2M` -> `02`, `PT45S` -> `45`.
pub fn format_duration(iso_duration: &str) -> String {
    let body = iso_duration.strip_prefix("PT").unwrap_or(iso_duration);

    let mut parts = Vec::new();
    let mut number = String::new();
    for c in body.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' | 'M' | 'S' => {
                if !number.is_empty() {
                    parts.push(format!("{:0>2}", number));
                    number.clear();
                }
            }
            _ => number.clear(),
        }
    }
    if !number.is_empty() {
        parts.push(format!("{:0>2}", number));
    }

    parts.join(":")
}

/// Humanize a raw view/like counter: `950`, `1.5K`, `2.5M`. Absent or
/// non-numeric counters render as `0`.
pub fn format_count(count: Option<&str>) -> String {
    let Some(num) = count.and_then(|c| c.trim().parse::<u64>().ok()) else {
        return "0".to_string();
    };

    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Format a video summary as human-readable markdown
pub fn format_summary_readable(summary: &VideoSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", summary.title));

    if !summary.channel_name.is_empty() {
        output.push_str(&format!("**Channel:** {}\n", summary.channel_name));
    }
    output.push_str(&format!(
        "**Duration:** {} | **Views:** {} | **Likes:** {} | **Calories:** {}\n\n",
        summary.duration, summary.views, summary.likes, summary.estimated_calories
    ));
    output.push_str(&format!(
        "**Workout:** {} | **Difficulty:** {}\n\n",
        summary.workout_type, summary.difficulty
    ));

    if !summary.equipment.is_empty() {
        output.push_str("## Equipment\n\n");
        for item in &summary.equipment {
            output.push_str(&format!("• {}\n", item));
        }
        output.push('\n');
    }

    if !summary.target_muscles.is_empty() {
        output.push_str("## Target muscles\n\n");
        output.push_str(&summary.target_muscles.join(", "));
        output.push_str("\n\n");
    }

    output.push_str("## Exercises\n\n");
    if summary.exercises.is_empty() {
        output.push_str("No exercises identified.\n\n");
    }
    for (i, exercise) in summary.exercises.iter().enumerate() {
        output.push_str(&format!("### {}. {}\n\n", i + 1, exercise.name));
        output.push_str(&format!(
            "{} sets × {} reps | Intensity: {} | Rest: {}\n",
            exercise.sets, exercise.reps, exercise.intensity, exercise.rest_period
        ));
        if let Some(duration) = &exercise.duration {
            output.push_str(&format!("Duration: {}\n", duration));
        }
        if let Some(rounds) = &exercise.rounds {
            output.push_str(&format!("Rounds: {}\n", rounds));
        }
        if !exercise.target_muscles.is_empty() {
            output.push_str(&format!("Targets: {}\n", exercise.target_muscles.join(", ")));
        }
        if !exercise.notes.is_empty() {
            output.push_str(&format!("Notes: {}\n", exercise.notes));
        }
        output.push('\n');
    }

    output
}
