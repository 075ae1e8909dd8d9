//! Interactive chat and single-question handlers

use std::collections::VecDeque;
use std::io;
use std::io::Write;

use futures::StreamExt;
use tracing::error;

use crate::cli::output::*;
use crate::rag::RagService;
use crate::rag::Role;
use crate::rag::Turn;
use crate::AppConfig;
use crate::Result;
use crate::TaxRagError;

const CURSOR: &str = "▌";
const ERASE_CURSOR: &str = "\u{8} \u{8}";

/// Messages shown on screen, capped to the most recent ones
///
/// Separate from the pipeline's session history: trimming it never
/// affects what the model sees.
pub struct Transcript {
    messages: VecDeque<Turn>,
    limit: usize,
}

impl Transcript {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, turn: Turn) {
        if self.limit == 0 {
            return;
        }
        while self.messages.len() >= self.limit {
            self.messages.pop_front();
        }
        self.messages.push_back(turn);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.messages.iter()
    }
}

/// Print the answer as it streams, with a trailing cursor while in progress
///
/// Returns the complete answer text.
pub async fn stream_answer(rag: &RagService, question: &str, session_id: &str) -> Result<String> {
    render_answer(&mut io::stdout(), rag, question, session_id).await
}

async fn render_answer<W: Write>(
    out: &mut W,
    rag: &RagService,
    question: &str,
    session_id: &str,
) -> Result<String> {
    let mut answer = rag.ask(question, session_id);
    let mut full_answer = String::new();
    let mut cursor_shown = false;

    write!(out, "🤖 ")?;
    out.flush()?;

    while let Some(fragment) = answer.next().await {
        if cursor_shown {
            write!(out, "{ERASE_CURSOR}")?;
            cursor_shown = false;
        }
        match fragment {
            Ok(text) => {
                write!(out, "{text}{CURSOR}")?;
                out.flush()?;
                cursor_shown = true;
                full_answer.push_str(&text);
            }
            Err(e) => {
                writeln!(out)?;
                return Err(e);
            }
        }
    }

    if cursor_shown {
        write!(out, "{ERASE_CURSOR}")?;
    }
    writeln!(out)?;
    Ok(full_answer)
}

/// User-facing message for a failed exchange
pub fn report_failure(err: &TaxRagError) {
    error!("Exchange failed: {}", err);
    match err {
        TaxRagError::PartialStream { .. } => {
            print_error("답변이 중간에 끊겼습니다. 질문을 다시 입력해주세요.");
        }
        _ => match err.failed_stage() {
            Some(stage) => print_error(&format!(
                "답변을 생성하지 못했습니다 ({stage} 단계). 질문을 다시 입력해주세요."
            )),
            None => print_error(&format!("오류가 발생했습니다: {err}")),
        },
    }
}

fn print_transcript(transcript: &Transcript) {
    if transcript.is_empty() {
        print_info("대화 기록이 없습니다.");
        return;
    }
    for turn in transcript.iter() {
        let speaker = match turn.role() {
            Role::User => "🧑",
            Role::Assistant => "🤖",
        };
        println!("{speaker} {}", turn.content());
    }
}

pub async fn handle_chat(
    config: &AppConfig,
    rag: &RagService,
    session: Option<String>,
) -> Result<()> {
    let session_id = session.unwrap_or_else(|| config.default_session().to_string());
    let mut transcript = Transcript::new(config.chat.max_display_messages);

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║  💬 소득세 챗봇                                                 ║");
    println!("║  소득세에 관련된 모든 것을 답해드립니다!                        ║");
    println!("║  Commands: /reset, /history, exit | quit | q                   ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!();

    loop {
        print_prompt("🧑 ");

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            println!();
            break;
        }
        let question = input.trim();

        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit")
            || question.eq_ignore_ascii_case("quit")
            || question.eq_ignore_ascii_case("q")
        {
            print_success("대화를 종료합니다.");
            break;
        }
        if question == "/reset" {
            transcript.clear();
            rag.history().reset(&session_id);
            print_success("대화 기록을 초기화했습니다.");
            continue;
        }
        if question == "/history" {
            print_transcript(&transcript);
            continue;
        }

        transcript.push(Turn::user(question));
        match stream_answer(rag, question, &session_id).await {
            Ok(answer) => transcript.push(Turn::assistant(answer)),
            Err(e) => report_failure(&e),
        }
        println!();
    }

    Ok(())
}

pub async fn handle_ask(
    config: &AppConfig,
    rag: &RagService,
    question: &str,
    session: Option<String>,
) -> Result<()> {
    let session_id = session.unwrap_or_else(|| config.default_session().to_string());
    println!("🧑 {question}");

    if let Err(e) = stream_answer(rag, question, &session_id).await {
        report_failure(&e);
        return Err(e);
    }
    Ok(())
}
