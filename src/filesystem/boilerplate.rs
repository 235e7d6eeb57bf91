use std::str::FromStr;

use derive_more::Display;
use snafu::ensure;

use super::error::{AlreadyExistsSnafu, NamespaceError};
use super::namespace::Namespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Mkdir(&'static str),
    Touch(&'static str),
    Cd(&'static str),
}

/// Starter project layouts, each a fixed list of steps run from the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Template {
    #[display("django")]
    Django,
    #[display("react")]
    React,
    #[display("python")]
    Python,
}

const DJANGO_STEPS: &[Step] = &[
    Step::Mkdir("project_name"),
    Step::Cd("project_name"),
    Step::Mkdir("app"),
    Step::Touch("manage.py"),
    Step::Touch("requirements.txt"),
    Step::Mkdir("templates"),
    Step::Mkdir("static"),
    Step::Cd(".."),
];

const REACT_STEPS: &[Step] = &[
    Step::Mkdir("src"),
    Step::Mkdir("public"),
    Step::Touch("package.json"),
    Step::Cd("src"),
    Step::Touch("index.js"),
    Step::Cd(".."),
    Step::Cd("public"),
    Step::Touch("index.html"),
    Step::Cd(".."),
];

const PYTHON_STEPS: &[Step] = &[
    Step::Mkdir("src"),
    Step::Touch("main.py"),
    Step::Touch("requirements.txt"),
    Step::Mkdir("tests"),
];

impl Template {
    pub const ALL: [Template; 3] = [Template::Django, Template::React, Template::Python];

    pub fn steps(self) -> &'static [Step] {
        match self {
            Template::Django => DJANGO_STEPS,
            Template::React => REACT_STEPS,
            Template::Python => PYTHON_STEPS,
        }
    }

    /// Names the template creates directly in the directory it starts from.
    pub fn top_level_names(self) -> Vec<&'static str> {
        let mut depth = 0usize;
        let mut names = Vec::new();
        for step in self.steps() {
            match *step {
                Step::Cd("..") => depth = depth.saturating_sub(1),
                Step::Cd(_) => depth += 1,
                Step::Mkdir(name) | Step::Touch(name) if depth == 0 => names.push(name),
                Step::Mkdir(_) | Step::Touch(_) => {}
            }
        }
        names
    }

    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Template {
    type Err = NamespaceError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|template| template.to_string() == name)
            .ok_or_else(|| NamespaceError::UnknownTemplate {
                name: name.to_string(),
                supported: Self::supported(),
            })
    }
}

impl Namespace {
    /// Lays out a starter project in the current directory.
    ///
    /// Fails before touching anything if one of the top-level names is taken.
    /// The cursor ends where it started, also when a step fails halfway. Steps
    /// that completed before a failure are kept, each mirrored on disk.
    pub fn create_boilerplate(&mut self, template_name: &str) -> Result<Template, NamespaceError> {
        let template: Template = template_name.parse()?;
        for name in template.top_level_names() {
            ensure!(
                self.tree.child(self.cursor, name).is_none(),
                AlreadyExistsSnafu { name }
            );
        }

        let start = self.cursor;
        let result = template.steps().iter().try_for_each(|step| match *step {
            Step::Mkdir(name) => self.create_directory(name).map(drop),
            Step::Touch(name) => self.create_file(name).map(drop),
            Step::Cd(path) => self.change_directory(path),
        });
        self.cursor = start;

        result.map(|()| {
            tracing::info!("Created {} boilerplate at {}", template, self.cursor_path());
            template
        })
    }
}
