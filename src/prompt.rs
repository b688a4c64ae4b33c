//! Prompt templates for the question-writing model.
//!
//! The literal field labels in these templates (`Pregunta:`, `OPCION_A:`..`OPCION_D:`,
//! `Respuesta:`, `Explicacion:`) are the grammar the parser matches. Changing them here
//! without changing `parser` breaks every subsequent parse.

use crate::parser::QuestionLayout;

pub const DOCUMENT_START: &str = "<Begin Document>";
pub const DOCUMENT_END: &str = "<End Document>";

const PAIR_TEMPLATE: &str = "Eres un profesor creando preguntas para un cuestionario.
Dado el siguiente documento, genera exactamente 2 preguntas de opción múltiple (MCQ),
cada una con 4 opciones (OPCION_A, OPCION_B, OPCION_C, OPCION_D) y la letra de la respuesta correcta.

Usa el siguiente formato:

Pregunta: <escribe la pregunta aquí>
OPCION_A: <primera opción>
OPCION_B: <segunda opción>
OPCION_C: <tercera opción>
OPCION_D: <cuarta opción>
Respuesta: <A o B o C o D>

Las preguntas deben ser detalladas, claras y basadas únicamente en la información proporcionada en el documento.
";

const BLOCKS_TEMPLATE: &str = "Eres un profesor creando preguntas para un cuestionario.
Dado el siguiente documento, genera exactamente {count} preguntas de opción múltiple (MCQ),
cada una con 4 opciones (OPCION_A, OPCION_B, OPCION_C, OPCION_D) y la letra de la respuesta correcta.

Usa el siguiente formato para cada pregunta, separando las preguntas con una línea en blanco:

Pregunta: <escribe la pregunta aquí>
OPCION_A: <primera opción>
OPCION_B: <segunda opción>
OPCION_C: <tercera opción>
OPCION_D: <cuarta opción>
Respuesta: <A o B o C o D>
Explicacion: <opcional: por qué la respuesta es correcta>

Las preguntas deben ser detalladas, claras y basadas únicamente en la información proporcionada en el documento.
";

/// Builds prompts for one `QuestionLayout`. Building never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    layout: QuestionLayout,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(QuestionLayout::Pair)
    }
}

impl PromptBuilder {
    pub fn new(layout: QuestionLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> QuestionLayout {
        self.layout
    }

    pub fn build(&self, document: &str) -> String {
        let preamble = match self.layout {
            QuestionLayout::Pair => PAIR_TEMPLATE.to_string(),
            QuestionLayout::Blocks { count } => BLOCKS_TEMPLATE.replace("{count}", &count.to_string()),
        };
        format!("{preamble}\n{DOCUMENT_START}\n{document}\n{DOCUMENT_END}")
    }
}

/// Two-question prompt for `document`.
pub fn build_prompt(document: &str) -> String {
    PromptBuilder::default().build(document)
}
