use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;

use crate::feedback::pipeline::{self, FeedbackServices, PipelineOutcome};
use crate::feedback::{
    FeedbackForm, FormRejection, Notice, NoticeLevel, MAX_COMMENT_CHARS, MAX_RATING,
};
use crate::i18n::{Language, Localizer, MessageKey};

/// Values for a non-interactive submission.
#[derive(Debug, Clone)]
pub(crate) struct OneShot {
    pub language: Language,
    pub comment: String,
    pub rating: u8,
    pub unique_code: String,
}

pub(crate) fn run_feedback_flow(
    rt: &tokio::runtime::Runtime,
    services: &dyn FeedbackServices,
    mut l10n: Localizer,
) -> Result<()> {
    let language_index = prompt_choice(
        &l10n,
        &format!("{}:", l10n.t(MessageKey::SelectLanguage)),
        &Language::ALL
            .iter()
            .map(|l| format!("{} ({})", l.display_name(), l.code()))
            .collect::<Vec<_>>(),
        Language::ALL
            .iter()
            .position(|l| *l == l10n.language())
            .unwrap_or(0),
    )?;
    let language = Language::ALL[language_index];
    l10n.set_language(language);

    println!();
    println!("{}", l10n.t(MessageKey::Title).bright_cyan().bold());
    println!();

    let mut form = FeedbackForm::new(language);

    println!(
        "{} {}",
        format!("{}:", l10n.t(MessageKey::Comment)).bright_white(),
        format!("({}, max {MAX_COMMENT_CHARS})", l10n.t(MessageKey::Placeholder)).bright_black()
    );
    println!("{}", l10n.t(MessageKey::FinishHint).bright_black());
    loop {
        let message = read_multiline_message()?;
        // Ignored result: the form is idle here, replacing the comment cannot be refused.
        let _ = form.set_comment(message);
        if !form.draft().is_too_long() {
            break;
        }
        print_notice(&Notice::error(l10n.t(MessageKey::CommentTooLong)));
        println!(
            "{}",
            format!("{}/{MAX_COMMENT_CHARS}", form.draft().comment_len()).bright_red()
        );
    }

    let rating = prompt_rating(&l10n)?;
    let _ = form.select_star(rating);

    print!(
        "{} {} ",
        format!("{}:", l10n.t(MessageKey::UniqueCode)).bright_white(),
        format!("[{}]", l10n.t(MessageKey::CodePlaceholder)).bright_black()
    );
    let _ = io::stdout().flush();
    let mut code = String::new();
    io::stdin().read_line(&mut code)?;
    let _ = form.set_unique_code(code.trim());

    submit_form(rt, services, &mut form, &l10n);
    Ok(())
}

/// Submit without prompts. Returns whether the feedback was saved.
pub(crate) fn run_one_shot(
    rt: &tokio::runtime::Runtime,
    services: &dyn FeedbackServices,
    l10n: Localizer,
    values: OneShot,
) -> bool {
    let mut form = FeedbackForm::new(values.language);
    let mut l10n = l10n;
    l10n.set_language(values.language);

    let _ = form.set_comment(values.comment);
    let _ = form.select_star(values.rating);
    let _ = form.set_unique_code(values.unique_code);

    submit_form(rt, services, &mut form, &l10n)
        .as_ref()
        .is_some_and(PipelineOutcome::is_success)
}

fn submit_form(
    rt: &tokio::runtime::Runtime,
    services: &dyn FeedbackServices,
    form: &mut FeedbackForm,
    l10n: &Localizer,
) -> Option<PipelineOutcome> {
    let request = match form.begin_submit() {
        Ok(request) => request,
        Err(rejection) => {
            if let Some(notice) = rejection.notice(l10n) {
                print_notice(&notice);
            }
            if rejection == FormRejection::CommentTooLong {
                println!(
                    "{}",
                    format!("{}/{MAX_COMMENT_CHARS}", form.draft().comment_len()).bright_red()
                );
            }
            return None;
        }
    };

    println!();
    println!("{}", l10n.t(MessageKey::Submitting).bright_cyan());

    let outcome = rt.block_on(pipeline::run_pipeline(services, &request, |stage| {
        println!(
            "  {} {}",
            "›".bright_black(),
            l10n.t(stage.message_key()).bright_black()
        );
    }));
    form.finish_submit(&outcome);

    print_notice(&outcome.notice(l10n));
    if let PipelineOutcome::Saved { sentiment, .. } = &outcome {
        println!(
            "  {} {}",
            l10n.t(MessageKey::Sentiment).bright_black(),
            sentiment.bright_white()
        );
    }
    Some(outcome)
}

fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => println!("{} {}", "✓".bright_green(), notice.text.bright_green()),
        NoticeLevel::Warning => println!("{} {}", "⚠".bright_yellow(), notice.text.bright_yellow()),
        NoticeLevel::Error => println!("{} {}", "✗".bright_red(), notice.text.bright_red()),
    }
}

fn prompt_choice(
    l10n: &Localizer,
    prompt: &str,
    options: &[String],
    default_index: usize,
) -> Result<usize> {
    loop {
        println!("{}", prompt.bright_white());
        for (i, opt) in options.iter().enumerate() {
            println!("  {} {}", format!("{:>2}.", i + 1).bright_black(), opt);
        }
        print!(
            "{} ",
            format!(
                "{} [{}]:",
                l10n.t(MessageKey::EnterNumber),
                default_index + 1
            )
            .bright_yellow()
        );
        let _ = io::stdout().flush();

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(default_index);
        }
        if let Ok(n) = trimmed.parse::<usize>() {
            if n >= 1 && n <= options.len() {
                return Ok(n - 1);
            }
        }
        println!("{}", l10n.t(MessageKey::InvalidChoice).bright_red());
        println!();
    }
}

fn prompt_rating(l10n: &Localizer) -> Result<u8> {
    loop {
        print!(
            "{} ",
            format!("{} (0-{MAX_RATING}) [0]:", l10n.t(MessageKey::Rating)).bright_white()
        );
        let _ = io::stdout().flush();

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        match parse_rating(&input) {
            Some(rating) => return Ok(rating),
            None => println!("{}", format!("0-{MAX_RATING}").bright_yellow()),
        }
    }
}

fn parse_rating(input: &str) -> Option<u8> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse::<u8>().ok().filter(|r| *r <= MAX_RATING)
}

fn read_multiline_message() -> Result<String> {
    let mut lines = Vec::new();
    loop {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            break;
        }
        lines.push(line.to_string());
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::pipeline::tests::{MockServices, Reply};

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("\n"), Some(0));
        assert_eq!(parse_rating(" 4 "), Some(4));
        assert_eq!(parse_rating("6"), None);
        assert_eq!(parse_rating("five"), None);
    }

    #[test]
    fn test_one_shot_success_and_failure() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let values = OneShot {
            language: Language::En,
            comment: "Great service".to_string(),
            rating: 5,
            unique_code: String::new(),
        };

        let services = MockServices::all_ok();
        assert!(run_one_shot(&rt, &services, Localizer::default(), values.clone()));

        let services = MockServices::new(Reply::Ok, Reply::Status(503), Reply::Ok);
        assert!(!run_one_shot(&rt, &services, Localizer::default(), values));
        assert!(!services.calls().contains(&"submit".to_string()));
    }

    #[test]
    fn test_one_shot_too_long_never_calls_services() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let services = MockServices::all_ok();
        let values = OneShot {
            language: Language::Fr,
            comment: "a".repeat(MAX_COMMENT_CHARS + 1),
            rating: 3,
            unique_code: "XYZ123".to_string(),
        };

        assert!(!run_one_shot(&rt, &services, Localizer::default(), values));
        assert!(services.calls().is_empty());
    }
}
