//! Lesson catalog: the built-in Spanish course and custom course files.
//!
//! A catalog is the content side of the lesson service. Custom courses are
//! JSON files with the same shape the service returns:
//! `{ "lessons": [...], "exercises": [...] }`.

use crate::types::*;
use crate::{Error, Result};
use fs2::FileExt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Lessons and their exercises, in presentation order
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// Cached default catalog, built once per process
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached built-in course
pub fn default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

impl Catalog {
    /// Look up a lesson by id
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    /// Exercises belonging to a lesson, in presentation order
    pub fn exercises_for(&self, lesson_id: &str) -> Vec<Exercise> {
        self.exercises
            .iter()
            .filter(|e| e.lesson_id == lesson_id)
            .cloned()
            .collect()
    }

    /// Load a catalog from a JSON course file and validate it
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&contents)?;

        let errors = catalog.validate();
        if !errors.is_empty() {
            for error in &errors {
                tracing::warn!("Catalog {:?}: {}", path, error);
            }
            return Err(Error::CatalogValidation(format!(
                "{} problem(s) in {:?}, first: {}",
                errors.len(),
                path,
                errors[0]
            )));
        }

        tracing::info!(
            "Loaded catalog from {:?} ({} lessons, {} exercises)",
            path,
            catalog.lessons.len(),
            catalog.exercises.len()
        );
        Ok(catalog)
    }

    /// Write the catalog as pretty JSON, replacing the target atomically
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved catalog to {:?}", path);
        Ok(())
    }

    /// Validate catalog consistency
    ///
    /// Returns a list of problems; empty means the catalog is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut lesson_ids = HashSet::new();

        for lesson in &self.lessons {
            if !lesson_ids.insert(lesson.id.as_str()) {
                errors.push(format!("Duplicate lesson id '{}'", lesson.id));
            }
            if lesson.level == 0 {
                errors.push(format!("Lesson '{}': level must be at least 1", lesson.id));
            }

            let count = self
                .exercises
                .iter()
                .filter(|e| e.lesson_id == lesson.id)
                .count() as u32;
            if count != lesson.total_exercises {
                errors.push(format!(
                    "Lesson '{}': totalExercises is {} but {} exercises are defined",
                    lesson.id, lesson.total_exercises, count
                ));
            }
        }

        let mut exercise_ids = HashSet::new();
        for exercise in &self.exercises {
            let id = &exercise.id;
            if !exercise_ids.insert(id.as_str()) {
                errors.push(format!("Duplicate exercise id '{}'", id));
            }
            if !lesson_ids.contains(exercise.lesson_id.as_str()) {
                errors.push(format!(
                    "Exercise '{}': unknown lesson '{}'",
                    id, exercise.lesson_id
                ));
            }
            if exercise.correct_answer.trim().is_empty() {
                errors.push(format!("Exercise '{}': empty correct answer", id));
            }

            match (exercise.kind, &exercise.options) {
                (ExerciseType::MultipleChoice, None) => {
                    errors.push(format!("Exercise '{}': multiple choice without options", id));
                }
                (ExerciseType::MultipleChoice, Some(options)) => {
                    if !options.contains(&exercise.correct_answer) {
                        errors.push(format!(
                            "Exercise '{}': correct answer '{}' is not among the options",
                            id, exercise.correct_answer
                        ));
                    }
                }
                (_, Some(_)) => {
                    errors.push(format!(
                        "Exercise '{}': options are only allowed on multiple choice",
                        id
                    ));
                }
                (_, None) => {}
            }
        }

        errors
    }
}

// ============================================================================
// Built-in course
// ============================================================================

fn vocab(spanish: &str, translation: &str, example: Option<&str>) -> VocabularyItem {
    VocabularyItem {
        spanish: spanish.into(),
        translation: translation.into(),
        example: example.map(Into::into),
    }
}

fn multiple_choice(
    id: &str,
    lesson_id: &str,
    question: &str,
    answer: &str,
    others: &[&str],
) -> Exercise {
    let mut options: Vec<String> = others.iter().map(|o| o.to_string()).collect();
    options.insert(id.len() % (others.len() + 1), answer.to_string());

    Exercise {
        id: id.into(),
        lesson_id: lesson_id.into(),
        kind: ExerciseType::MultipleChoice,
        question: question.into(),
        question_spanish: None,
        correct_answer: answer.into(),
        options: Some(options),
        hint: None,
    }
}

fn free_text(
    id: &str,
    lesson_id: &str,
    kind: ExerciseType,
    question: &str,
    answer: &str,
    hint: Option<&str>,
) -> Exercise {
    Exercise {
        id: id.into(),
        lesson_id: lesson_id.into(),
        kind,
        question: question.into(),
        question_spanish: None,
        correct_answer: answer.into(),
        options: None,
        hint: hint.map(Into::into),
    }
}

#[allow(clippy::too_many_arguments)]
fn lesson(
    id: &str,
    title: &str,
    description: &str,
    level: u32,
    icon: &str,
    color: &str,
    vocabulary: Vec<VocabularyItem>,
    grammar_notes: Option<&str>,
) -> Lesson {
    Lesson {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        level,
        icon: icon.into(),
        color: color.into(),
        total_exercises: 0,
        completed: false,
        vocabulary,
        grammar_notes: grammar_notes.map(Into::into),
    }
}

/// Build the built-in course
///
/// Prefer [`default_catalog`], which caches the result.
pub fn build_default_catalog() -> Catalog {
    use ExerciseType::{FillInBlank, Translation};

    let mut lessons = vec![
        lesson(
            "greetings",
            "Greetings",
            "Say hello and goodbye",
            1,
            "👋",
            "#58cc02",
            vec![
                vocab("hola", "hello", Some("¡Hola! ¿Qué tal?")),
                vocab("adiós", "goodbye", None),
                vocab("buenos días", "good morning", Some("Buenos días, señora.")),
                vocab("gracias", "thank you", None),
                vocab("por favor", "please", None),
            ],
            None,
        ),
        lesson(
            "numbers",
            "Numbers",
            "Count from one to ten",
            1,
            "🔢",
            "#1cb0f6",
            vec![
                vocab("uno", "one", None),
                vocab("dos", "two", None),
                vocab("tres", "three", None),
                vocab("diez", "ten", Some("Tengo diez años.")),
            ],
            None,
        ),
        lesson(
            "family",
            "Family",
            "Talk about your family",
            2,
            "👪",
            "#ff9600",
            vec![
                vocab("la madre", "mother", None),
                vocab("el padre", "father", None),
                vocab("el hermano", "brother", Some("Mi hermano es alto.")),
                vocab("la hermana", "sister", None),
            ],
            Some("Nouns have gender: el for masculine, la for feminine."),
        ),
        lesson(
            "food",
            "Food",
            "Order something to eat",
            2,
            "🍎",
            "#ff4b4b",
            vec![
                vocab("la manzana", "apple", None),
                vocab("el pan", "bread", None),
                vocab("el agua", "water", Some("Quiero agua, por favor.")),
                vocab("la piña", "pineapple", None),
            ],
            None,
        ),
        lesson(
            "verbs",
            "Everyday Verbs",
            "Tener, estar and ir in the present",
            3,
            "🏃",
            "#ce82ff",
            vec![
                vocab("tener", "to have", Some("Tengo un perro.")),
                vocab("estar", "to be (state, location)", Some("Ella está en casa.")),
                vocab("ir", "to go", Some("Vamos a la playa.")),
            ],
            Some("Estar describes temporary states and locations; ser describes identity."),
        ),
    ];

    let exercises = vec![
        multiple_choice("greetings-1", "greetings", "How do you say 'hello'?", "Hola", &["Adiós", "Gracias", "Por favor"]),
        free_text("greetings-2", "greetings", Translation, "Good morning", "Buenos días", None),
        free_text("greetings-3", "greetings", FillInBlank, "___ días, señora.", "Buenos", Some("Good")),
        multiple_choice("greetings-4", "greetings", "What does 'gracias' mean?", "Thank you", &["Please", "Goodbye", "Hello"]),
        free_text("greetings-5", "greetings", Translation, "Please", "Por favor", None),
        multiple_choice("numbers-1", "numbers", "Which number is 'tres'?", "3", &["1", "2", "10"]),
        free_text("numbers-2", "numbers", Translation, "Two", "Dos", None),
        free_text("numbers-3", "numbers", FillInBlank, "Tengo ___ años. (10)", "diez", Some("Ten")),
        free_text("numbers-4", "numbers", Translation, "One", "Uno", None),
        multiple_choice("family-1", "family", "How do you say 'mother'?", "La madre", &["El padre", "La hermana", "El hermano"]),
        free_text("family-2", "family", Translation, "The brother", "El hermano", None),
        free_text("family-3", "family", FillInBlank, "___ padre lee un libro.", "El", Some("Masculine article")),
        free_text("family-4", "family", Translation, "The sister", "La hermana", None),
        multiple_choice("food-1", "food", "What is 'la piña'?", "Pineapple", &["Apple", "Bread", "Water"]),
        free_text("food-2", "food", Translation, "The bread", "El pan", None),
        free_text("food-3", "food", FillInBlank, "Quiero ___, por favor. (water)", "agua", None),
        free_text("food-4", "food", Translation, "The pineapple", "La piña", None),
        free_text("verbs-1", "verbs", FillInBlank, "Yo ___ un perro. (tener)", "Tengo", Some("First person of tener")),
        multiple_choice("verbs-2", "verbs", "Ella ___ en casa.", "está", &["es", "esta", "tiene"]),
        free_text("verbs-3", "verbs", Translation, "I have", "Tengo", None),
        free_text("verbs-4", "verbs", Translation, "How are you?", "¿Cómo estás?", Some("Use estar")),
        free_text("verbs-5", "verbs", FillInBlank, "Nosotros ___ a la playa. (ir)", "vamos", None),
    ];

    for lesson in &mut lessons {
        lesson.total_exercises = exercises
            .iter()
            .filter(|e| e.lesson_id == lesson.id)
            .count() as u32;
    }

    Catalog { lessons, exercises }
}
