//! 提示词模板
//!
//! 面向弗拉芒中学生，提示词使用荷兰语；每个模板都要求模型只返回 JSON

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Question, StudyLevel, TestType};

/// 系统消息：只能使用提供的原文
pub const SYSTEM_INSTRUCTION: &str = "Je bent een gespecialiseerde onderwijsassistent voor het Vlaamse middelbaar onderwijs.
BELANGRIJKSTE REGEL: Gebruik EXCLUSIEF de verstrekte brontekst om studiemateriaal te genereren. Verzin geen extra informatie die niet in de tekst staat.
Gebruik altijd Nederlands. Houd rekening met het opgegeven niveau (1ste t/m 6de middelbaar) qua taalgebruik en complexiteit.
Antwoord uitsluitend met geldige JSON, zonder extra uitleg.";

/// 每份测验的题目数量
pub const QUESTIONS_PER_TEST: usize = 5;

/// 每份卡片集的卡片数量
pub const FLASHCARDS_PER_SET: usize = 10;

pub fn summary_prompt(text: &str, level: StudyLevel) -> String {
    format!(
        r#"Maak een zeer overzichtelijke, gestructureerde samenvatting van de volgende tekst voor een leerling uit het {level}.
Verdeel de samenvatting in logische hoofdstukken met titels. Geef voor elk hoofdstuk ook een lijst met belangrijke kernpunten.
Bedenk voor elk hoofdstuk ook een beschrijving voor een educatieve illustratie die het onderwerp visueel verduidelijkt.

Gebruik exact dit JSON formaat:
{{"title": "...", "introduction": "...", "sections": [{{"title": "...", "content": "...", "keyPoints": ["..."], "imagePrompt": "..."}}], "conclusion": "..."}}

BRONTEKST:
{text}"#,
        level = level.label(),
        text = text
    )
}

pub fn glossary_prompt(text: &str, level: StudyLevel) -> String {
    format!(
        r#"Maak een begrippenlijst van de belangrijkste termen uit de BRONTEKST voor het {level}. Geef voor elke term een duidelijke definitie gebaseerd op de context van de tekst.

Gebruik exact dit JSON formaat:
[{{"term": "...", "definition": "..."}}]

BRONTEKST:
{text}"#,
        level = level.label(),
        text = text
    )
}

pub fn flashcards_prompt(text: &str, level: StudyLevel) -> String {
    format!(
        r#"Genereer {count} effectieve steekkaarten gebaseerd op de BRONTEKST voor het {level}. Elke kaart moet een relevante vraag of term aan de voorzijde hebben en een antwoord of uitleg aan de achterzijde, gebaseerd op de tekst.

Gebruik exact dit JSON formaat:
[{{"front": "...", "back": "..."}}]

BRONTEKST:
{text}"#,
        count = FLASHCARDS_PER_SET,
        level = level.label(),
        text = text
    )
}

pub fn mindmap_prompt(text: &str, level: StudyLevel) -> String {
    format!(
        r#"Genereer een hiërarchische structuur voor een mindmap over de BRONTEKST voor het {level}. De structuur moet de hoofdthema's en subthema's uit de tekst weergeven.

Gebruik exact dit geneste JSON formaat:
{{"name": "...", "children": [{{"name": "...", "children": [{{"name": "..."}}]}}]}}

BRONTEKST:
{text}"#,
        level = level.label(),
        text = text
    )
}

pub fn test_prompt(text: &str, level: StudyLevel, test_type: TestType) -> String {
    let instruction = match test_type {
        TestType::MultipleChoice => format!(
            "Genereer een meerkeuzetoets met {} vragen over de BRONTEKST voor het {}. Gebruik enkel feiten uit de tekst. Voeg voor elke vraag 4 opties toe; het correcte antwoord moet letterlijk een van de opties zijn.",
            QUESTIONS_PER_TEST,
            level.label()
        ),
        TestType::OpenQuestions => format!(
            "Genereer een toets met {} open vragen over de BRONTEKST voor het {}. Vragen moeten peilen naar begrip van de tekst.",
            QUESTIONS_PER_TEST,
            level.label()
        ),
    };

    let shape = match test_type {
        TestType::MultipleChoice => {
            r#"[{"id": "q1", "question": "...", "options": ["...", "...", "...", "..."], "correctAnswer": "..."}]"#
        }
        TestType::OpenQuestions => r#"[{"id": "q1", "question": "...", "correctAnswer": "..."}]"#,
    };

    format!(
        "{instruction}\nGeef elke vraag een unieke id.\n\nGebruik exact dit JSON formaat:\n{shape}\n\nBRONTEKST:\n{text}"
    )
}

/// 发给批改模型的题目视图
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionForGrading<'a> {
    id: &'a str,
    question: &'a str,
    #[serde(skip_serializing_if = "no_options")]
    options: &'a [String],
    correct_answer: &'a str,
}

fn no_options(options: &&[String]) -> bool {
    options.is_empty()
}

pub fn grading_prompt(
    original_text: &str,
    questions: &[Question],
    answers: &BTreeMap<String, String>,
    level: StudyLevel,
) -> serde_json::Result<String> {
    let questions_for_grading: Vec<QuestionForGrading<'_>> = questions
        .iter()
        .map(|q| QuestionForGrading {
            id: &q.id,
            question: &q.question,
            options: q.options(),
            correct_answer: &q.correct_answer,
        })
        .collect();

    let questions_json = serde_json::to_string(&questions_for_grading)?;
    let answers_json = serde_json::to_string(answers)?;

    Ok(format!(
        r#"Verbeter de volgende test voor een leerling van het {level} op basis van de originele tekst.

ORIGINELE TEKST: {original_text}

VRAGEN EN CORRECTE ANTWOORDEN: {questions_json}

ANTWOORDEN VAN DE LEERLING: {answers_json}
Vragen zonder antwoord van de leerling zijn niet beantwoord en tellen als fout.

Geef een score op {max_score}, algemene feedback en gedetailleerde feedback per vraag. Neem elke vraag exact één keer op, met haar id. Leg bij fouten uit wat het juiste antwoord was op basis van de tekst.

Gebruik exact dit JSON formaat:
{{"score": 0, "maxScore": {max_score}, "feedback": "...", "gradedQuestions": [{{"questionId": "...", "userAnswer": "...", "isCorrect": false, "correctAnswer": "...", "feedback": "..."}}]}}"#,
        level = level.label(),
        max_score = questions.len(),
    ))
}

/// 插图提示词
pub fn illustration_prompt(prompt: &str) -> String {
    format!(
        "A clean, professional educational illustration or diagram for a school textbook about: {prompt}. Minimalist style, clear labels if necessary, bright and engaging colors, no text if possible, white background, 16:9 aspect ratio."
    )
}
