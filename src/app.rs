use std::path::Path;

use log::{debug, info};
use rand::Rng;

use crate::config::Config;
use crate::quiz::error::SaveFileError;
use crate::quiz::{codec, scoring, QuestionCatalog, QuestionSession, Verdict, LIKERT_POINTS};

const HELP_TEXT: &str = "Commands:
  <question> <answer>  answer a question, 1 = disagree ... 6 = agree
  show                 list the questions and your answers
  submit               see your results
  retake               start over after seeing your results
  reset                clear all answers
  quiz [<number>]      switch to another questionnaire
  save <file>          save your progress (.txt is added if missing)
  load <file>          load saved progress
  help                 show this text
  about                what this program is
  quit                 leave the application";

const ABOUT_TEXT: &str = "A quiz of agree/disagree statements that decides which of two \
camps you belong to: East Coast or West Coast, cats or dogs, beer or wine. Each \
statement leans toward one side; rate how strongly you agree and the side with \
more points wins.";

const NOT_ALL_ANSWERED: &str = "Not all questions have been answered yet!";
const NOTHING_TO_RESET: &str = "Nothing to reset; no questions have been answered yet.";
const SAVEFILE_INVALID: &str = "Error: savefile invalid.";
const SAVEFILE_LOADED: &str = "Savefile successfully loaded.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer { question: usize, answer: u8 },
    Show,
    Submit,
    Retake,
    Reset,
    Quiz(Option<usize>),
    Save(String),
    Load(String),
    Help,
    About,
    Quit,
}

/// Parses one line of user input. Question, answer and quiz numbers are 1-based.
pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.trim();
    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "show" | "s" if rest.is_empty() => Command::Show,
        "submit" if rest.is_empty() => Command::Submit,
        "retake" if rest.is_empty() => Command::Retake,
        "reset" if rest.is_empty() => Command::Reset,
        "help" | "h" | "?" if rest.is_empty() => Command::Help,
        "about" if rest.is_empty() => Command::About,
        "quit" | "exit" | "q" if rest.is_empty() => Command::Quit,
        "quiz" if rest.is_empty() => Command::Quiz(None),
        "quiz" => Command::Quiz(Some(parse_one_based(rest)?)),
        "save" => Command::Save(rest.to_owned()),
        "load" => Command::Load(rest.to_owned()),
        _ => {
            let question = parse_one_based(word)?;
            let answer = parse_one_based(rest)?;
            if answer > usize::from(LIKERT_POINTS) - 1 {
                return None;
            }
            Command::Answer {
                question,
                answer: answer as u8,
            }
        }
    };
    Some(command)
}

/// `"3"` becomes `Some(2)`; zero and non-numbers are rejected.
fn parse_one_based(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_sub(1)
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Choosing,
    Questions,
    Results(Verdict),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirmation {
    Reset,
    Quit,
}

/// Terminal front end. Owns the running session and turns each input line
/// into calls on the quiz core plus lines of text to print.
pub struct App<R> {
    catalog: QuestionCatalog,
    config: Config,
    rng: R,
    session: Option<QuestionSession>,
    view: View,
    pending: Option<Confirmation>,
    running: bool,
}

impl<R: Rng> App<R> {
    pub fn new(catalog: QuestionCatalog, config: Config, rng: R) -> Self {
        Self {
            catalog,
            config,
            rng,
            session: None,
            view: View::Choosing,
            pending: None,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session(&self) -> Option<&QuestionSession> {
        self.session.as_ref()
    }

    /// Text shown before the first input.
    pub fn greeting(&self) -> Vec<String> {
        let mut out = vec!["Welcome! Pick a questionnaire to begin.".to_owned()];
        out.extend(self.questionnaire_list());
        out
    }

    pub fn handle(&mut self, input: &str) -> Vec<String> {
        if let Some(confirmation) = self.pending.take() {
            return self.confirm(confirmation, is_yes(input));
        }
        if self.view == View::Choosing {
            return self.choose(input);
        }

        match parse_command(input) {
            Some(command) => self.run(command),
            None if input.trim().is_empty() => Vec::new(),
            None => vec!["Unknown command. Type `help` for a list of commands.".to_owned()],
        }
    }

    fn run(&mut self, command: Command) -> Vec<String> {
        debug!("Running {:?}", command);
        match command {
            Command::Answer { question, answer } => self.answer(question, answer),
            Command::Show => self.render_questions(),
            Command::Submit => self.submit(),
            Command::Retake => self.retake(),
            Command::Reset => self.ask_reset(),
            Command::Quiz(None) => {
                self.view = View::Choosing;
                let mut out = self.questionnaire_list();
                out.push("Enter a number, or `cancel` to keep your current quiz.".to_owned());
                out
            }
            Command::Quiz(Some(id)) => self.start(id),
            Command::Save(path) => self.save(&path),
            Command::Load(path) => self.load(&path),
            Command::Help => vec![HELP_TEXT.to_owned()],
            Command::About => vec![ABOUT_TEXT.to_owned()],
            Command::Quit => {
                self.pending = Some(Confirmation::Quit);
                vec!["Are you sure you want to quit? [y/N]".to_owned()]
            }
        }
    }

    fn choose(&mut self, input: &str) -> Vec<String> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("cancel") && self.session.is_some() {
            self.view = View::Questions;
            return vec!["Keeping the current questionnaire.".to_owned()];
        }
        if let Some(id) = parse_one_based(input) {
            return self.start_listed(id);
        }
        match parse_command(input) {
            Some(Command::Quiz(Some(id))) => self.start_listed(id),
            Some(
                command @ (Command::Help | Command::About | Command::Quit | Command::Load(_)),
            ) => self.run(command),
            _ => vec![self.choose_prompt()],
        }
    }

    fn start_listed(&mut self, id: usize) -> Vec<String> {
        if id < self.catalog.size() {
            self.start(id)
        } else {
            vec![self.choose_prompt()]
        }
    }

    fn choose_prompt(&self) -> String {
        format!(
            "Please enter a number between 1 and {}.",
            self.catalog.size()
        )
    }

    fn start(&mut self, id: usize) -> Vec<String> {
        let questionnaire = match self.catalog.get(id) {
            Ok(questionnaire) => questionnaire,
            Err(_) => {
                return vec![format!(
                    "There is no questionnaire {}. Type `quiz` to see the list.",
                    id + 1
                )]
            }
        };

        info!("Starting questionnaire {} \"{}\"", id, questionnaire.short_title);
        self.session = Some(QuestionSession::start(questionnaire, &mut self.rng));
        self.view = View::Questions;
        self.render_questions()
    }

    fn answer(&mut self, question: usize, answer: u8) -> Vec<String> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        match session.record_response(question, answer) {
            Ok(_) => {
                if matches!(self.view, View::Results(_)) {
                    self.view = View::Questions;
                }
                vec![format!(
                    "Question {}: {}. Progress: {}/{}",
                    question + 1,
                    answer + 1,
                    session.progress(),
                    session.len()
                )]
            }
            Err(err) => {
                debug!("Rejected answer: {}", err);
                vec![format!(
                    "There is no question {}; pick one between 1 and {}.",
                    question + 1,
                    session.len()
                )]
            }
        }
    }

    fn submit(&mut self) -> Vec<String> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let Ok(questionnaire) = self.catalog.get(session.questionnaire_id()) else {
            return Vec::new();
        };

        match scoring::tally(session, questionnaire, &mut self.rng) {
            Ok(verdict) => {
                self.view = View::Results(verdict);
                let result = questionnaire.result(verdict.pole);
                vec![
                    result.title.clone(),
                    String::new(),
                    result.text.clone(),
                    String::new(),
                    format!("Picture: {}", result.image),
                    "Type `retake` to take the quiz again.".to_owned(),
                ]
            }
            Err(err) => {
                debug!("Submit refused: {}", err);
                vec![NOT_ALL_ANSWERED.to_owned()]
            }
        }
    }

    fn retake(&mut self) -> Vec<String> {
        if !matches!(self.view, View::Results(_)) {
            return vec!["Submit your answers first, or use `reset` to clear them.".to_owned()];
        }
        self.reset()
    }

    fn ask_reset(&mut self) -> Vec<String> {
        match &self.session {
            Some(session) if session.has_progress() => {
                self.pending = Some(Confirmation::Reset);
                vec!["Are you sure you want to clear all of your answers? [y/N]".to_owned()]
            }
            _ => vec![NOTHING_TO_RESET.to_owned()],
        }
    }

    fn reset(&mut self) -> Vec<String> {
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
        self.view = View::Questions;
        let mut out = vec!["All answers cleared.".to_owned()];
        out.extend(self.render_questions());
        out
    }

    fn confirm(&mut self, confirmation: Confirmation, yes: bool) -> Vec<String> {
        match (confirmation, yes) {
            (Confirmation::Reset, true) => self.reset(),
            (Confirmation::Quit, true) => {
                self.running = false;
                vec!["Goodbye!".to_owned()]
            }
            (_, false) => Vec::new(),
        }
    }

    fn save(&mut self, path: &str) -> Vec<String> {
        // No file named means the save was cancelled.
        if path.is_empty() {
            return Vec::new();
        }
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let Ok(questionnaire) = self.catalog.get(session.questionnaire_id()) else {
            return Vec::new();
        };

        match codec::save_to_path(self.config.resolve(path), session, questionnaire) {
            Ok(written) => vec![format!("Progress saved to {}.", written.display())],
            Err(err) => vec![format!("Error: could not save progress: {}", err)],
        }
    }

    fn load(&mut self, path: &str) -> Vec<String> {
        if path.is_empty() {
            return Vec::new();
        }
        let path = self.config.resolve(path);

        match codec::load_from_path(&path, &self.catalog) {
            Ok(session) => {
                self.session = Some(session);
                self.view = View::Questions;
                let mut out = vec![SAVEFILE_LOADED.to_owned()];
                out.extend(self.render_questions());
                out
            }
            Err(SaveFileError::Codec(_)) => vec![SAVEFILE_INVALID.to_owned()],
            Err(SaveFileError::Io(err)) => vec![read_error(&path, &err)],
        }
    }

    fn questionnaire_list(&self) -> Vec<String> {
        self.catalog
            .short_titles()
            .into_iter()
            .zip(self.catalog.descriptions())
            .enumerate()
            .map(|(i, (title, description))| format!("  {}. {} - {}", i + 1, title, description))
            .collect()
    }

    fn render_questions(&self) -> Vec<String> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let Ok(questionnaire) = self.catalog.get(session.questionnaire_id()) else {
            return Vec::new();
        };

        let mut out = vec![questionnaire.title.clone(), String::new()];
        for position in 0..session.len() {
            let text = session
                .question_at(questionnaire, position)
                .map_or("", |q| q.text.as_str());
            let marks = (0..LIKERT_POINTS)
                .map(|point| {
                    if session.response_at(position) == Some(point) {
                        "X"
                    } else {
                        "."
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            out.push(format!("{:>3}. {}", position + 1, text));
            out.push(format!("     Disagree [ {} ] Agree", marks));
        }
        out.push(String::new());
        out.push(format!("Progress: {}/{}", session.progress(), session.len()));
        out
    }
}

fn read_error(path: &Path, err: &std::io::Error) -> String {
    format!("Error: could not read {}: {}", path.display(), err)
}
