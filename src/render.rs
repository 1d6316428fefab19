use heartbridge::core::report::ANXIETY_THRESHOLD;
use heartbridge::core::AffectExplanation;
use heartbridge::{AggregateReport, CohortComparison, Post};

const BAR_WIDTH: usize = 30;
const WORDS_SHOWN: usize = 15;

pub fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts yet.");
        return;
    }

    for post in posts {
        println!(
            "#{} [{}] {} · {} · 👍 {}",
            post.id,
            post.author_role,
            post.display_name(),
            post.created_at.format("%Y-%m-%d %H:%M"),
            post.likes
        );
        println!("   {}", post.title);
        println!("   {}", post.content);
    }
}

pub fn print_explanation(text: &str, e: &AffectExplanation) {
    println!("📝 {}", text);
    println!(
        "  Valence: {:.3} ({}{})",
        e.valence,
        e.valence_tier.name(),
        e.valence_trigger
            .as_ref()
            .map(|t| format!(", trigger \"{}\"", t))
            .unwrap_or_default()
    );
    println!(
        "  Arousal: {:.3} ({:?}{})",
        e.arousal,
        e.arousal_level,
        e.arousal_trigger
            .as_ref()
            .map(|t| format!(", trigger \"{}\"", t))
            .unwrap_or_default()
    );
}

pub fn print_report(title: &str, report: &AggregateReport) {
    println!("📊 {}", title);

    if report.is_empty() {
        println!("  Not enough data yet.");
        return;
    }

    let delta = report.warmth_delta();
    println!("  Posts: {}", report.post_count);
    println!(
        "  Warmth index: {}% ({:+}%)",
        report.warmth_index(),
        delta
    );
    println!(
        "  Anxiety rate: {}% (valence < {})",
        report.anxiety_percent(),
        ANXIETY_THRESHOLD
    );

    println!("  Valence distribution:");
    let max = report.histogram.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bucket in &report.histogram {
        let bar = "█".repeat(bucket.count * BAR_WIDTH / max);
        println!(
            "    {:<9} {} {:<w$} {}",
            bucket.label,
            bucket.range_label(),
            bar,
            bucket.count,
            w = BAR_WIDTH
        );
    }

    let q = &report.quadrants;
    println!(
        "  Mood quadrants: tense {} · excited {} · weary {} · calm {}",
        q.tense, q.excited, q.weary, q.calm
    );

    if !report.word_frequencies.is_empty() {
        let words: Vec<String> = report
            .word_frequencies
            .iter()
            .take(WORDS_SHOWN)
            .map(|(w, c)| format!("{}({})", w, c))
            .collect();
        println!("  Top words: {}", words.join(" "));
    }
}

pub fn print_comparison(comparison: &CohortComparison) {
    print_report("Community", &comparison.overall);
    for (role, report) in &comparison.by_role {
        println!();
        print_report(&format!("Cohort: {}", role), report);
    }
}
