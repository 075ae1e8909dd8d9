//! End-to-end pipeline behaviour against stubbed services

mod common;

use std::sync::Arc;

use common::rag_service;
use common::StubChatModel;
use common::StubEmbedder;
use common::StubIndex;
use futures::StreamExt;
use taxrag::errors::ErrorKind;
use taxrag::errors::Stage;
use taxrag::llm::ChatRole;
use taxrag::rag::QueryNormalizer;
use taxrag::rag::Retriever;
use taxrag::rag::Role;
use taxrag::rag::Turn;
use taxrag::TaxRagError;

async fn collect(rag: &taxrag::rag::RagService, question: &str, session: &str) -> Vec<String> {
    let mut stream = rag.ask(question, session);
    let mut fragments = Vec::new();
    while let Some(fragment) = stream.next().await {
        fragments.push(fragment.unwrap());
    }
    fragments
}

#[tokio::test]
async fn test_question_without_dictionary_phrase_passes_through() {
    let normalizer = QueryNormalizer::new(
        Arc::new(StubChatModel::new(&[])),
        &["사람을 나타내는 표현 -> 거주자".to_string()],
    );

    let question = "종합소득세 신고 기한은 언제인가요?";
    assert_eq!(normalizer.normalize(question).await.unwrap(), question);
}

#[tokio::test]
async fn test_retrieval_returns_top_k_by_score() {
    let index = StubIndex::new(&[("c", 0.2), ("a", 0.9), ("d", 0.1), ("b", 0.7)]);
    let retriever = Retriever::new(Arc::new(StubEmbedder), Arc::new(index), 2);

    let passages = retriever.retrieve("거주자").await.unwrap();
    assert_eq!(passages.len(), 2);
    assert_eq!(passages[0].text, "a");
    assert_eq!(passages[1].text, "b");
    assert!(passages[0].score >= passages[1].score);
}

#[tokio::test]
async fn test_fragments_reach_caller_in_order_and_are_stored_concatenated() {
    let model = Arc::new(StubChatModel::new(&["가", "나", "", "다라"]));
    let rag = rag_service(model, &[("A", 0.9), ("B", 0.8)]);

    let fragments = collect(&rag, "질문", "s").await;
    assert_eq!(fragments, vec!["가", "나", "", "다라"]);

    let turns = rag.history().get_or_create("s");
    assert_eq!(turns[1].content(), "가나다라");
}

#[tokio::test]
async fn test_answer_prompt_carries_context_and_original_question() {
    let model = Arc::new(StubChatModel::new(&["ok"]));
    let rag = rag_service(model.clone(), &[("A", 0.9), ("B", 0.8)]);

    collect(&rag, "직장인 소득세?", "s").await;

    let messages = &model.streamed()[0];
    assert_eq!(messages[0].role, ChatRole::System);
    assert!(messages[0].content.ends_with("\n\nA\n\nB"));
    let last = messages.last().unwrap();
    assert_eq!(last.role, ChatRole::User);
    assert_eq!(last.content, "직장인 소득세?");
}

#[tokio::test]
async fn test_success_appends_exactly_one_pair() {
    let model = Arc::new(StubChatModel::new(&["답", "변"]));
    let rag = rag_service(model, &[("A", 0.9)]);

    rag.history().append_exchange("s", "이전 질문", "이전 답변");
    collect(&rag, "새 질문", "s").await;

    let turns = rag.history().get_or_create("s");
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[2], Turn::user("새 질문"));
    assert_eq!(turns[3], Turn::assistant("답변"));
}

#[tokio::test]
async fn test_failure_before_first_fragment_appends_nothing() {
    let model = Arc::new(StubChatModel::new(&["never"]).fail_after(0));
    let rag = rag_service(model, &[("A", 0.9)]);

    let mut stream = rag.ask("질문", "s");
    let err = stream.next().await.unwrap().unwrap_err();
    assert_eq!(err.failed_stage(), Some(Stage::Generate));
    assert_eq!(err.kind(), ErrorKind::Request);
    assert!(stream.next().await.is_none());

    assert!(rag.history().get_or_create("s").is_empty());
}

#[tokio::test]
async fn test_failure_mid_stream_is_partial_and_appends_nothing() {
    let model = Arc::new(StubChatModel::new(&["소득세법", " 제50조에", " 따르면"]).fail_after(2));
    let rag = rag_service(model, &[("A", 0.9)]);

    let mut stream = rag.ask("질문", "s");
    assert_eq!(stream.next().await.unwrap().unwrap(), "소득세법");
    assert_eq!(stream.next().await.unwrap().unwrap(), " 제50조에");
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(err, TaxRagError::PartialStream { delivered: 2, .. }));
    assert_eq!(err.kind(), ErrorKind::PartialStream);

    assert_eq!(rag.history().turn_count("s"), 0);
}

#[tokio::test]
async fn test_dropping_the_stream_commits_nothing() {
    let model = Arc::new(StubChatModel::new(&["하나", "둘", "셋"]));
    let rag = rag_service(model, &[("A", 0.9)]);

    let mut stream = rag.ask("질문", "s");
    assert_eq!(stream.next().await.unwrap().unwrap(), "하나");
    drop(stream);

    assert_eq!(rag.history().turn_count("s"), 0);
}

#[tokio::test]
async fn test_nothing_runs_until_polled() {
    let model = Arc::new(StubChatModel::new(&["a"]));
    let rag = rag_service(model.clone(), &[("A", 0.9)]);

    let stream = rag.ask("질문", "s");
    assert!(model.streamed().is_empty());
    assert_eq!(rag.history().session_count(), 0);
    drop(stream);
}

#[tokio::test]
async fn test_sessions_do_not_see_each_other() {
    let model = Arc::new(StubChatModel::new(&["A 답변"]));
    let rag = rag_service(model.clone(), &[("ctx", 0.9)]);

    rag.history().append_exchange("B", "B 질문", "B 답변");
    collect(&rag, "A 질문", "A").await;

    let b_turns = rag.history().get_or_create("B");
    assert_eq!(b_turns, vec![Turn::user("B 질문"), Turn::assistant("B 답변")]);

    let messages = &model.streamed()[0];
    assert!(messages.iter().all(|m| !m.content.contains("B 질문")));
}

#[tokio::test]
async fn test_history_is_fed_back_to_the_model() {
    let model = Arc::new(StubChatModel::new(&["답"]));
    let rag = rag_service(model.clone(), &[("ctx", 0.9)]);

    collect(&rag, "첫 질문", "s").await;
    collect(&rag, "두번째 질문", "s").await;

    let second = &model.streamed()[1];
    let n = second.len();
    assert_eq!(second[n - 3].content, "첫 질문");
    assert_eq!(second[n - 2].content, "답");
    assert_eq!(second[n - 1].content, "두번째 질문");
}

#[tokio::test]
async fn test_basic_deduction_scenario() {
    let model = Arc::new(StubChatModel::new(&[
        "소득세법",
        " 제50조에",
        " 따르면, 기본공제는 150만원입니다.",
    ]));
    let rag = rag_service(
        model.clone(),
        &[("소득세법에 따르면 기본 공제는 150만원입니다.", 0.93)],
    );

    let question = "소득세 기본공제가 얼마야?";
    let answer: String = collect(&rag, question, "default").await.concat();
    assert_eq!(answer, "소득세법 제50조에 따르면, 기본공제는 150만원입니다.");

    let turns = rag.history().get_or_create("default");
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role(), Role::User);
    assert_eq!(turns[0].content(), question);
    assert_eq!(turns[1].role(), Role::Assistant);
    assert_eq!(turns[1].content(), answer);

    let system = &model.streamed()[0][0].content;
    assert!(system.ends_with("\n\n소득세법에 따르면 기본 공제는 150만원입니다."));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_asks_keep_pairs_adjacent() {
    let model = Arc::new(StubChatModel::new(&["같은", " 답"]));
    let rag = rag_service(model, &[("ctx", 0.9)]);

    let mut handles = Vec::new();
    for i in 0..16 {
        let rag = rag.clone();
        handles.push(tokio::spawn(async move {
            collect(&rag, &format!("질문 {i}"), "shared").await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let turns = rag.history().get_or_create("shared");
    assert_eq!(turns.len(), 32);
    for pair in turns.chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert!(pair[0].content().starts_with("질문 "));
        assert_eq!(pair[1], Turn::assistant("같은 답"));
    }
}
