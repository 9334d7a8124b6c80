//! Instruction templates for the generation collaborator.
//!
//! One template per task kind, keyed by target language: known languages get a
//! pre-authored illustrative example, any other language name is interpolated
//! into a generic instruction instead. Builders are pure functions of their
//! inputs.

use std::borrow::Cow;

use super::{TaskKind, truncate_chars};

/// Joined merge input is capped so the reduce prompt stays inside the
/// collaborator's context window.
const MERGE_INPUT_CAP: usize = 25_000;

const PLAIN_EXAMPLES: &[(&str, &str)] = &[
    ("English", "Example: 'This document discusses...'"),
    ("Indonesian", "Contoh: 'Dokumen ini membahas...'"),
    ("Spanish", "Ejemplo: 'Este documento discute...'"),
    ("French", "Exemple: 'Ce document traite de...'"),
    ("German", "Beispiel: 'Dieses Dokument behandelt...'"),
];

const HIERARCHICAL_EXAMPLES: &[(&str, &str)] = &[
    (
        "English",
        "Example: '• Main Topic\n  - Subtopic 1\n  - Subtopic 2'",
    ),
    (
        "Indonesian",
        "Contoh: '• Topik Utama\n  - Subtopik 1\n  - Subtopik 2'",
    ),
    (
        "Spanish",
        "Ejemplo: '• Tema Principal\n  - Subtema 1\n  - Subtema 2'",
    ),
    (
        "French",
        "Exemple: '• Sujet Principal\n  - Sous-sujet 1\n  - Sous-sujet 2'",
    ),
    (
        "German",
        "Beispiel: '• Hauptthema\n  - Unterthema 1\n  - Unterthema 2'",
    ),
];

const STRUCTURED_EXAMPLES: &[(&str, &str)] = &[
    (
        "English",
        r#"{
  "executive_summary": "This document discusses...",
  "bullets": ["First key point", "Second key point"],
  "highlights": ["Important sentence one", "Important sentence two"]
}"#,
    ),
    (
        "Indonesian",
        r#"{
  "executive_summary": "Dokumen ini membahas...",
  "bullets": ["Poin kunci pertama", "Poin kunci kedua"],
  "highlights": ["Kalimat penting satu", "Kalimat penting dua"]
}"#,
    ),
    (
        "Spanish",
        r#"{
  "executive_summary": "Este documento discute...",
  "bullets": ["Primer punto clave", "Segundo punto clave"],
  "highlights": ["Primera oración importante", "Segunda oración importante"]
}"#,
    ),
    (
        "French",
        r#"{
  "executive_summary": "Ce document traite de...",
  "bullets": ["Premier point clé", "Deuxième point clé"],
  "highlights": ["Première phrase importante", "Deuxième phrase importante"]
}"#,
    ),
    (
        "German",
        r#"{
  "executive_summary": "Dieses Dokument behandelt...",
  "bullets": ["Erster Schlüsselpunkt", "Zweiter Schlüsselpunkt"],
  "highlights": ["Erster wichtiger Satz", "Zweiter wichtiger Satz"]
}"#,
    ),
];

const STRUCTURED_HIERARCHICAL_EXAMPLES: &[(&str, &str)] = &[
    (
        "English",
        r#"{
  "executive_summary": "Main Topic:\n- Subtopic 1\n- Subtopic 2",
  "bullets": ["First hierarchical point", "Second hierarchical point"],
  "highlights": ["Important sentence one", "Important sentence two"]
}"#,
    ),
    (
        "Indonesian",
        r#"{
  "executive_summary": "Topik Utama:\n- Subtopik 1\n- Subtopik 2",
  "bullets": ["Poin hierarkis pertama", "Poin hierarkis kedua"],
  "highlights": ["Kalimat penting satu", "Kalimat penting dua"]
}"#,
    ),
    (
        "Spanish",
        r#"{
  "executive_summary": "Tema Principal:\n- Subtema 1\n- Subtema 2",
  "bullets": ["Primer punto jerárquico", "Segundo punto jerárquico"],
  "highlights": ["Primera oración importante", "Segunda oración importante"]
}"#,
    ),
    (
        "French",
        r#"{
  "executive_summary": "Sujet Principal:\n- Sous-sujet 1\n- Sous-sujet 2",
  "bullets": ["Premier point hiérarchique", "Deuxième point hiérarchique"],
  "highlights": ["Première phrase importante", "Deuxième phrase importante"]
}"#,
    ),
    (
        "German",
        r#"{
  "executive_summary": "Hauptthema:\n- Unterthema 1\n- Unterthema 2",
  "bullets": ["Erster hierarchischer Punkt", "Zweiter hierarchischer Punkt"],
  "highlights": ["Erster wichtiger Satz", "Zweiter wichtiger Satz"]
}"#,
    ),
];

const MERGE_INSTRUCTIONS: &[(&str, &str)] = &[
    (
        "English",
        "Combine these summaries into one cohesive summary. Remove redundancy while maintaining all key information.",
    ),
    (
        "Indonesian",
        "Gabungkan ringkasan-ringkasan ini menjadi satu ringkasan yang kohesif. Hapus redundansi sambil mempertahankan semua informasi kunci.",
    ),
    (
        "Spanish",
        "Combine estos resúmenes en un resumen cohesivo. Elimine la redundancia mientras mantiene toda la información clave.",
    ),
    (
        "French",
        "Combinez ces résumés en un résumé cohérent. Supprimez la redondance tout en conservant toutes les informations clés.",
    ),
    (
        "German",
        "Kombinieren Sie diese Zusammenfassungen zu einer zusammenhängenden Zusammenfassung. Entfernen Sie Redundanzen, während Sie alle wichtigen Informationen beibehalten.",
    ),
];

const QA_EXAMPLES: &[(&str, &str)] = &[
    ("English", "Example: 'Based on the document, the answer is...'"),
    ("Indonesian", "Contoh: 'Berdasarkan dokumen, jawabannya adalah...'"),
    ("Spanish", "Ejemplo: 'Según el documento, la respuesta es...'"),
    ("French", "Exemple: 'Selon le document, la réponse est...'"),
    ("German", "Beispiel: 'Laut dem Dokument lautet die Antwort...'"),
];

fn lookup<'a>(table: &'a [(&str, &str)], language: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, value)| *value)
}

fn example_for(kind: TaskKind, language: &str) -> Cow<'static, str> {
    let table = match kind {
        TaskKind::Plain => PLAIN_EXAMPLES,
        TaskKind::Hierarchical => HIERARCHICAL_EXAMPLES,
        TaskKind::Structured => STRUCTURED_EXAMPLES,
        TaskKind::StructuredHierarchical => STRUCTURED_HIERARCHICAL_EXAMPLES,
    };

    match lookup(table, language) {
        Some(example) => Cow::Borrowed(example),
        None => Cow::Owned(format!("Write all text in {language}")),
    }
}

/// Renders the instruction text for one window of input.
pub(super) fn build(kind: TaskKind, language: &str, text: &str) -> String {
    let example = example_for(kind, language);

    match kind {
        TaskKind::Plain => format!(
            "You are a professional document summarizer.\n\n\
             ABSOLUTE REQUIREMENT: Write your ENTIRE response in {language} language ONLY.\n\
             - Do NOT mix languages\n\
             - Do NOT use English if the target is not English\n\
             - Do NOT translate back to the source language\n\
             - EVERY word must be in {language}\n\n\
             {example}\n\n\
             Task: Summarize the following text in clear, concise paragraphs in {language}.\n\n\
             Text:\n{text}\n\n\
             OUTPUT LANGUAGE: {language} ONLY\n"
        ),
        TaskKind::Hierarchical => format!(
            "You are a professional document analyst.\n\n\
             ABSOLUTE REQUIREMENT: Write your ENTIRE response in {language} language ONLY.\n\
             - Do NOT mix languages\n\
             - Do NOT use English if the target is not English\n\
             - EVERY word, heading, and bullet point must be in {language}\n\n\
             {example}\n\n\
             Task: Create a hierarchical summary with main topics and subtopics in {language}.\n\n\
             Text:\n{text}\n\n\
             OUTPUT LANGUAGE: {language} ONLY\n"
        ),
        TaskKind::Structured => format!(
            "You are a professional analyst. Respond ONLY with valid JSON.\n\n\
             ABSOLUTE REQUIREMENT: ALL text in the JSON must be in {language} language ONLY.\n\
             - executive_summary: Write in {language}\n\
             - bullets: Write in {language}\n\
             - highlights: Write in {language}\n\
             - Do NOT mix languages\n\
             - Do NOT use English if the target is not English\n\n\
             Example JSON format in {language}:\n{example}\n\n\
             Task: Analyze the text and create JSON with:\n\
             - executive_summary: Comprehensive summary (3-5 sentences) in {language}\n\
             - bullets: Array of 5-10 key points in {language}\n\
             - highlights: Array of 5 most important sentences verbatim in {language}\n\n\
             Text:\n{text}\n\n\
             OUTPUT: Valid JSON with ALL text in {language} language ONLY\n"
        ),
        TaskKind::StructuredHierarchical => format!(
            "You are a professional analyst. Respond ONLY with valid JSON.\n\n\
             ABSOLUTE REQUIREMENT: ALL text in the JSON must be in {language} language ONLY.\n\
             - executive_summary: Hierarchical structure in {language}\n\
             - bullets: Hierarchical key points in {language}\n\
             - highlights: Important sentences in {language}\n\
             - Do NOT mix languages\n\
             - Do NOT use English if the target is not English\n\n\
             Example JSON format in {language}:\n{example}\n\n\
             Task: Analyze the documents using a hierarchical approach and create JSON with:\n\
             - executive_summary: Hierarchical summary with main topics and subtopics in {language}\n\
             - bullets: Array of 5-8 hierarchical key points in {language}\n\
             - highlights: Array of 5 most important sentences verbatim in {language}\n\n\
             Documents:\n{text}\n\n\
             OUTPUT: Valid JSON with ALL text in {language} language ONLY\n"
        ),
    }
}

/// Renders the instruction for merging several partial summaries into one.
pub(super) fn merge(language: &str, joined: &str) -> String {
    let instruction = match lookup(MERGE_INSTRUCTIONS, language) {
        Some(instruction) => Cow::Borrowed(instruction),
        None => Cow::Owned(format!("Combine these summaries in {language}")),
    };
    let joined = truncate_chars(joined, MERGE_INPUT_CAP);

    format!(
        "You are a professional editor.\n\n\
         ABSOLUTE REQUIREMENT: Write your ENTIRE response in {language} language ONLY.\n\n\
         Task: {instruction}\n\n\
         Summaries from different sections:\n{joined}\n\n\
         OUTPUT: Combined summary in {language} language ONLY\n"
    )
}

/// Renders the question-answering instruction over the (already truncated)
/// document text.
pub(super) fn question_answer(language: &str, documents: &str, question: &str) -> String {
    let example = match lookup(QA_EXAMPLES, language) {
        Some(example) => Cow::Borrowed(example),
        None => Cow::Owned(format!("Answer in {language}")),
    };

    format!(
        "You are a helpful AI assistant.\n\n\
         ABSOLUTE REQUIREMENT: Write your ENTIRE answer in {language} language ONLY.\n\
         - Do NOT mix languages\n\
         - Do NOT use English if the target is not English\n\
         - EVERY word in your answer must be in {language}\n\n\
         {example}\n\n\
         Task: Answer the question based ONLY on the document(s) below.\n\
         - Provide a concise, factual answer in {language}\n\
         - If you cannot find the answer, say so in {language}\n\n\
         Document(s):\n{documents}\n\n\
         Question:\n{question}\n\n\
         OUTPUT LANGUAGE: {language} ONLY\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_uses_preauthored_example() {
        let prompt = build(TaskKind::Plain, "French", "Bonjour le monde");
        assert!(prompt.contains("Exemple: 'Ce document traite de...'"));
        assert!(prompt.contains("Bonjour le monde"));
        assert!(prompt.contains("ENTIRE response in French"));
    }

    #[test]
    fn unknown_language_interpolates_generic_example() {
        let prompt = build(TaskKind::Structured, "Swahili", "Habari");
        assert!(prompt.contains("Write all text in Swahili"));
        assert!(prompt.contains("ALL text in the JSON must be in Swahili"));
    }

    #[test]
    fn structured_prompt_names_the_three_fields() {
        let prompt = build(TaskKind::Structured, "English", "text");
        assert!(prompt.contains("executive_summary"));
        assert!(prompt.contains("bullets"));
        assert!(prompt.contains("highlights"));
        assert!(prompt.contains("verbatim"));
    }

    #[test]
    fn building_is_pure() {
        let a = build(TaskKind::Hierarchical, "German", "ein Text");
        let b = build(TaskKind::Hierarchical, "German", "ein Text");
        assert_eq!(a, b);
    }

    #[test]
    fn merge_prompt_caps_joined_input() {
        let joined = "x".repeat(30_000);
        let prompt = merge("English", &joined);
        assert!(prompt.len() < 27_000);
        assert!(prompt.contains("Remove redundancy"));
    }

    #[test]
    fn qa_prompt_embeds_question_and_language() {
        let prompt = question_answer("Spanish", "doc body", "¿Qué dice?");
        assert!(prompt.contains("¿Qué dice?"));
        assert!(prompt.contains("ENTIRE answer in Spanish"));
        assert!(prompt.contains("Según el documento"));
    }
}
