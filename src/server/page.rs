use crate::{
    Result,
    analysis::{Analysis, EMPTY_INPUT_PROMPT},
    model::Sentiment,
};
use minijinja::{Environment, context};

const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// What one render of the page shows below the form.
#[derive(Debug, Default)]
pub struct PageView {
    pub input: String,
    pub analysis: Option<Analysis>,
    pub error: Option<String>,
}

impl PageView {
    pub fn with_analysis(input: String, analysis: Analysis) -> Self {
        Self {
            input,
            analysis: Some(analysis),
            error: None,
        }
    }

    pub fn with_error(input: String, error: String) -> Self {
        Self {
            input,
            analysis: None,
            error: Some(error),
        }
    }
}

pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, view: &PageView) -> Result<String> {
        let sentiment = view.analysis.and_then(|a| a.sentiment());
        let prompt = matches!(view.analysis, Some(Analysis::Empty)).then_some(EMPTY_INPUT_PROMPT);

        let template = self.env.get_template("index.html")?;
        Ok(template.render(context! {
            input => view.input,
            prompt => prompt,
            label => sentiment.map(Sentiment::label),
            tone => sentiment.map(tone),
            color => sentiment.map(color),
            error => view.error,
        })?)
    }
}

fn tone(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "positive",
        Sentiment::Negative => "negative",
    }
}

fn color(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "green",
        Sentiment::Negative => "red",
    }
}
