//! Line-oriented terminal front end over `QuizPage`.

use std::path::Path;
use std::sync::Arc;

use client::{Category, FileKvStore, HttpQuizApi, PageState, QuizPage};
use quiz_core::Clock;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Help,
    Quit,
    Login { email: String, password: String },
    Signup { username: String, email: String, password: String },
    Logout,
    Pick(usize),
    Topic(String),
    Answer { question: usize, option: usize },
    Refresh,
    Submit,
    Home,
    Clear,
    Scores,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("type `help` for commands".into());
    };
    let rest: Vec<&str> = words.collect();
    let number = |raw: &str| {
        raw.parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("expected a positive number, got {raw:?}"))
    };

    match (head, rest.as_slice()) {
        ("help" | "?", []) => Ok(Input::Help),
        ("quit" | "exit", []) => Ok(Input::Quit),
        ("login", [email, password]) => Ok(Input::Login {
            email: (*email).to_string(),
            password: (*password).to_string(),
        }),
        ("signup", [username, email, password]) => Ok(Input::Signup {
            username: (*username).to_string(),
            email: (*email).to_string(),
            password: (*password).to_string(),
        }),
        ("logout", []) => Ok(Input::Logout),
        ("pick", [n]) => number(*n).map(Input::Pick),
        ("topic", words) => Ok(Input::Topic(words.join(" "))),
        ("answer", [q, o]) => Ok(Input::Answer {
            question: number(*q)?,
            option: number(*o)?,
        }),
        ("refresh", []) => Ok(Input::Refresh),
        ("submit", []) => Ok(Input::Submit),
        ("home", []) => Ok(Input::Home),
        ("clear", []) => Ok(Input::Clear),
        ("scores", []) => Ok(Input::Scores),
        _ => Err(format!("unrecognised command: {}", line.trim())),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  login <email> <password>           signup <username> <email> <password>");
    println!("  logout                             scores");
    println!("  pick <n>     choose a category     topic <text>   quiz on any topic");
    println!("  answer <question> <option>         refresh        new questions");
    println!("  submit       score the quiz        home           back to topics");
    println!("  clear        forget question history               quit");
}

fn render(page: &QuizPage) {
    match page.state() {
        PageState::Home => {
            match page.user() {
                Some(user) => println!("\nWelcome to the Quiz Game, {}", user.username),
                None => println!("\nWelcome to the Quiz Game (not logged in)"),
            }
            for (i, category) in Category::ALL.iter().enumerate() {
                println!("  {}. {}", i + 1, category.topic());
            }
        }
        PageState::Quiz | PageState::Scored { .. } => {
            println!("\nQuiz Time: {}", page.topic());
            for (qi, question) in page.questions().iter().enumerate() {
                println!("Q{}: {}", qi + 1, question.text());
                for (oi, option) in question.options().iter().enumerate() {
                    let mark = if page.answer_for(qi) == Some(option.as_str()) {
                        "x"
                    } else {
                        " "
                    };
                    println!("   [{mark}] {}. {option}", oi + 1);
                }
            }
            if let PageState::Scored { correct, total } = page.state() {
                println!("Your Score: {correct} / {total}");
            }
        }
    }
}

/// Run the interactive client until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if the data directory or HTTP client cannot be set up,
/// or stdin fails.
pub async fn run(server_url: &str, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(FileKvStore::open(data_dir)?);
    let api = Arc::new(HttpQuizApi::new(server_url)?);
    info!(server = api.base_url(), dir = %data_dir.display(), "starting quiz client");

    let mut page = QuizPage::new(api, store, Clock::default());
    print_help();
    render(&page);

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match input {
            Input::Help => print_help(),
            Input::Quit => break,
            Input::Login { email, password } => {
                let _ = page.log_in(&email, &password).await;
            }
            Input::Signup {
                username,
                email,
                password,
            } => {
                let _ = page.sign_up(&username, &email, &password).await;
            }
            Input::Logout => page.sign_out()?,
            Input::Pick(n) => {
                let id = Category::ALL.get(n - 1).map(|c| c.id());
                page.pick_category(id).await;
            }
            Input::Topic(topic) => page.submit_custom_topic(&topic).await,
            Input::Answer { question, option } => {
                let chosen = page
                    .questions()
                    .get(question - 1)
                    .and_then(|q| q.options().get(option - 1))
                    .cloned();
                match chosen {
                    Some(chosen) => page.answer(question - 1, &chosen),
                    None => println!("no such question or option"),
                }
            }
            Input::Refresh => page.refresh().await,
            Input::Submit => {
                page.submit().await;
            }
            Input::Home => page.reset(),
            Input::Clear => page.clear_history(),
            Input::Scores => match page.profile_scores().await {
                Ok(scores) if scores.is_empty() => {
                    println!("No quiz scores yet. Try taking a quiz!");
                }
                Ok(scores) => {
                    for score in scores {
                        println!(
                            "  {:<24} {:>2} / {:<2} {}",
                            score.topic,
                            score.score,
                            score.total_questions,
                            score.created_at.format("%Y-%m-%d")
                        );
                    }
                }
                Err(e) => println!("{e}"),
            },
        }

        for alert in page.take_alerts() {
            println!("! {alert}");
        }
        render(&page);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input("pick 2"), Ok(Input::Pick(2)));
        assert_eq!(
            parse_input("topic ancient   rome"),
            Ok(Input::Topic("ancient rome".into()))
        );
        assert_eq!(
            parse_input("answer 3 1"),
            Ok(Input::Answer {
                question: 3,
                option: 1
            })
        );
        assert_eq!(
            parse_input("login a@b.c pw"),
            Ok(Input::Login {
                email: "a@b.c".into(),
                password: "pw".into()
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_input("").is_err());
        assert!(parse_input("pick 0").is_err());
        assert!(parse_input("answer one 2").is_err());
        assert!(parse_input("dance").is_err());
    }

    #[test]
    fn bare_topic_is_passed_through_for_the_empty_check() {
        assert_eq!(parse_input("topic"), Ok(Input::Topic(String::new())));
    }
}
