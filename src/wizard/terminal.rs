//! Terminal front end: a line-oriented menu over the wizard controller.
//!
//! Input lines are read as a stream so the loop works the same against
//! stdin and a scripted buffer. Toasts are drained after every action and
//! printed inline.

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info};

use super::context::Toast;
use super::controller::WizardController;
use super::steps::artifacts::parse_schema_kind;
use super::steps::{ArtifactsForm, StepForms};
use crate::error::WizardError;
use crate::onboarding::model::Direction;
use crate::onboarding::state::WizardStep;

const PROGRESS_WIDTH: usize = 24;

/// Typed at a keep-current prompt to clear the value.
const CLEAR: &str = "-";

enum Flow {
    Continue,
    Quit,
}

/// Line input plus output sink.
struct Terminal<W> {
    lines: BoxStream<'static, String>,
    out: W,
    toasts: broadcast::Receiver<Toast>,
}

impl<W: AsyncWrite + Unpin> Terminal<W> {
    async fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await
    }

    async fn prompt(&mut self, label: &str) -> std::io::Result<Option<String>> {
        self.write(&format!("{label}: ")).await?;
        Ok(self.lines.next().await.map(|l| l.trim().to_string()))
    }

    /// Empty input keeps `current`, `-` clears it.
    async fn prompt_keep(&mut self, label: &str, current: &str) -> std::io::Result<Option<String>> {
        let line = if current.is_empty() {
            self.prompt(label).await?
        } else {
            self.prompt(&format!("{label} [{current}]")).await?
        };
        Ok(line.map(|l| match l.as_str() {
            "" => current.to_string(),
            CLEAR => String::new(),
            _ => l,
        }))
    }

    /// Read lines until an empty one. An empty first line keeps `current`;
    /// a first line of `-` clears it.
    async fn prompt_lines(&mut self, label: &str, current: &str) -> std::io::Result<Option<String>> {
        self.write(&format!("{label} (one per line, empty line to finish):\n"))
            .await?;
        if !current.is_empty() {
            self.write(&format!("  current:\n{current}\n")).await?;
        }
        let mut collected = Vec::new();
        loop {
            match self.lines.next().await {
                None if collected.is_empty() => return Ok(None),
                None => break,
                Some(line) if collected.is_empty() && line.trim() == CLEAR => {
                    return Ok(Some(String::new()));
                }
                Some(line) if line.trim().is_empty() => break,
                Some(line) => collected.push(line.trim().to_string()),
            }
        }
        if collected.is_empty() {
            Ok(Some(current.to_string()))
        } else {
            Ok(Some(collected.join("\n")))
        }
    }

    async fn flush_toasts(&mut self) -> std::io::Result<()> {
        loop {
            match self.toasts.try_recv() {
                Ok(toast) => self.write(&format!("{toast}\n")).await?,
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Toast receiver lagged");
                }
                Err(_) => return Ok(()),
            }
        }
    }
}

/// Wizard session state owned by the terminal loop.
struct Session<'w, W> {
    wizard: &'w mut WizardController,
    term: Terminal<W>,
    forms: StepForms,
    /// Project the forms were last prefilled for.
    forms_project: Option<String>,
}

/// Run the interactive wizard until `q` or end of input.
pub async fn run_terminal<R, W>(
    wizard: &mut WizardController,
    input: R,
    output: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let lines = stream::unfold(input.lines(), |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((line, lines)),
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Error reading input: {}", e);
                None
            }
        }
    });

    let toasts = wizard.notifier().subscribe();
    let mut session = Session {
        wizard,
        term: Terminal {
            lines: lines.boxed(),
            out: output,
            toasts,
        },
        forms: StepForms::default(),
        forms_project: None,
    };

    session
        .term
        .write("PM Onboarding Wizard\nAt a [current] prompt, enter keeps the value and '-' clears it.\n")
        .await?;
    let _ = session.wizard.refresh_projects().await;

    loop {
        session.term.flush_toasts().await?;
        let flow = if session.wizard.selected_project().is_none() {
            session.project_menu().await?
        } else {
            session.step_menu().await?
        };
        if let Flow::Quit = flow {
            break;
        }
    }

    session.term.flush_toasts().await?;
    info!("Wizard session ended");
    Ok(())
}

impl<W: AsyncWrite + Unpin> Session<'_, W> {
    // ── Project picker ──────────────────────────────────────────────

    async fn project_menu(&mut self) -> std::io::Result<Flow> {
        let mut menu = String::from("\nProjects:\n");
        if self.wizard.projects().is_empty() {
            menu.push_str("  (none yet)\n");
        }
        for (i, p) in self.wizard.projects().iter().enumerate() {
            menu.push_str(&format!("  {}. {} ({})\n", i + 1, p.name, p.id));
        }
        menu.push_str("[number] open  [n] new  [r] refresh  [q] quit\n");
        self.term.write(&menu).await?;

        let Some(choice) = self.term.prompt(">").await? else {
            return Ok(Flow::Quit);
        };
        match choice.as_str() {
            "q" => return Ok(Flow::Quit),
            "r" => {
                let _ = self.wizard.refresh_projects().await;
            }
            "n" => {
                let Some(name) = self.term.prompt("Project name").await? else {
                    return Ok(Flow::Quit);
                };
                let Some(description) = self.term.prompt("Description (optional)").await? else {
                    return Ok(Flow::Quit);
                };
                let _ = self.wizard.create_project(&name, &description).await;
            }
            other => {
                let picked = other
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| self.wizard.projects().get(i))
                    .map(|p| p.id.clone());
                match picked {
                    Some(id) => {
                        let _ = self.wizard.select_project(&id).await;
                    }
                    None => self.term.write("Unknown choice.\n").await?,
                }
            }
        }
        Ok(Flow::Continue)
    }

    // ── Steps ───────────────────────────────────────────────────────

    fn sync_forms(&mut self) {
        let selected = self.wizard.selected_project().map(String::from);
        if selected != self.forms_project {
            if let Some(doc) = self.wizard.document() {
                self.forms = StepForms::from_document(doc, self.wizard.selected_meta());
                self.forms_project = selected;
            }
        }
    }

    fn header(&self) -> String {
        let step = self.wizard.step();
        let name = self
            .wizard
            .selected_meta()
            .map(|p| p.name.clone())
            .or_else(|| self.wizard.selected_project().map(String::from))
            .unwrap_or_default();
        let filled = (step.progress() * PROGRESS_WIDTH as f64).round() as usize;
        format!(
            "\n== {name} ==\n{step}: {}\n[{}{}]\n",
            step.title(),
            "#".repeat(filled),
            "-".repeat(PROGRESS_WIDTH.saturating_sub(filled)),
        )
    }

    async fn step_menu(&mut self) -> std::io::Result<Flow> {
        if self.wizard.document().is_none() {
            return self.reload_menu().await;
        }
        self.sync_forms();

        let step = self.wizard.step();
        let mut screen = self.header();
        if let Some(doc) = self.wizard.document() {
            screen.push_str(&self.forms.view(step).render(doc));
        }

        screen.push('\n');
        for (i, label) in actions(step).iter().enumerate() {
            screen.push_str(&format!("[{}] {label}  ", i + 1));
        }
        screen.push_str("[c] continue  [b] back  [v] view raw  [p] projects  [q] quit\n");
        self.term.write(&screen).await?;

        let Some(choice) = self.term.prompt(">").await? else {
            return Ok(Flow::Quit);
        };
        match choice.as_str() {
            "q" => Ok(Flow::Quit),
            "p" => {
                self.wizard.deselect();
                Ok(Flow::Continue)
            }
            "b" => {
                self.wizard.back();
                Ok(Flow::Continue)
            }
            "c" => {
                let _ = self.wizard.advance();
                Ok(Flow::Continue)
            }
            "v" => {
                let raw = self.raw_view();
                self.term.write(&raw).await?;
                Ok(Flow::Continue)
            }
            other => match other.parse::<usize>() {
                Ok(n) if (1..=actions(step).len()).contains(&n) => self.run_action(step, n).await,
                _ => {
                    self.term.write("Unknown choice.\n").await?;
                    Ok(Flow::Continue)
                }
            },
        }
    }

    /// Project metadata and the working document as pretty JSON.
    fn raw_view(&self) -> String {
        let mut out = String::from("\n-- Project --\n");
        match self.wizard.selected_meta() {
            Some(meta) => out.push_str(&format!(
                "Id: {}\nName: {}\nDescription: {}\nCreated: {}\nUpdated: {}\n",
                meta.id,
                meta.name,
                meta.description,
                meta.created_at.to_rfc3339(),
                meta.updated_at.to_rfc3339(),
            )),
            None => out.push_str(&format!(
                "Id: {}\n",
                self.wizard.selected_project().unwrap_or_default()
            )),
        }
        out.push_str("-- Onboarding --\n");
        let json = self
            .wizard
            .document()
            .map(serde_json::to_string_pretty)
            .transpose();
        match json {
            Ok(Some(json)) => out.push_str(&json),
            Ok(None) => out.push_str("(not loaded)"),
            Err(e) => out.push_str(&format!("(unprintable: {e})")),
        }
        out.push('\n');
        out
    }

    async fn reload_menu(&mut self) -> std::io::Result<Flow> {
        self.term
            .write("\nDocument not loaded. [r] retry  [p] projects  [q] quit\n")
            .await?;
        let Some(choice) = self.term.prompt(">").await? else {
            return Ok(Flow::Quit);
        };
        match choice.as_str() {
            "q" => return Ok(Flow::Quit),
            "p" => self.wizard.deselect(),
            "r" => {
                if let Some(id) = self.wizard.selected_project().map(String::from) {
                    let _ = self.wizard.select_project(&id).await;
                }
            }
            _ => self.term.write("Unknown choice.\n").await?,
        }
        Ok(Flow::Continue)
    }

    async fn run_action(&mut self, step: WizardStep, action: usize) -> std::io::Result<Flow> {
        let outcome = match (step, action) {
            (WizardStep::Basics, _) => {
                if !self.edit_basics().await? {
                    return Ok(Flow::Quit);
                }
                if action == 1 {
                    self.forms.basics.save_draft(self.wizard).await
                } else {
                    self.forms.basics.save_and_continue(self.wizard).await
                }
            }
            (WizardStep::Direction, _) => {
                if !self.edit_direction().await? {
                    return Ok(Flow::Quit);
                }
                self.forms.direction.save_and_continue(self.wizard).await
            }
            (WizardStep::UsersAndUseCases, 1) => {
                let Some(name) = self.term.prompt("Persona name").await? else {
                    return Ok(Flow::Quit);
                };
                self.forms.users.persona_name = name;
                let added = self.forms.users.add_persona(self.wizard).await;
                self.report_added(added).await?
            }
            (WizardStep::UsersAndUseCases, _) => {
                let Some(title) = self.term.prompt("Use case title").await? else {
                    return Ok(Flow::Quit);
                };
                let Some(criteria) = self.term.prompt_lines("Success criteria", "").await? else {
                    return Ok(Flow::Quit);
                };
                self.forms.users.use_case_title = title;
                self.forms.users.use_case_criteria = criteria;
                let added = self.forms.users.add_use_case(self.wizard).await;
                self.report_added(added).await?
            }
            (WizardStep::Metrics, 1) => {
                if !self.edit_objective().await? {
                    return Ok(Flow::Quit);
                }
                let added = self.forms.metrics.add_objective(self.wizard).await;
                self.report_added(added).await?
            }
            (WizardStep::Metrics, _) => {
                if !self.edit_guardrail().await? {
                    return Ok(Flow::Quit);
                }
                let added = self.forms.metrics.add_guardrail(self.wizard).await;
                self.report_added(added).await?
            }
            (WizardStep::Milestones, _) => {
                let Some(name) = self.term.prompt("Milestone name").await? else {
                    return Ok(Flow::Quit);
                };
                let Some(date) = self.term.prompt("Date (YYYY-MM-DD)").await? else {
                    return Ok(Flow::Quit);
                };
                let Some(criteria) = self.term.prompt_lines("Exit criteria", "").await? else {
                    return Ok(Flow::Quit);
                };
                let form = &mut self.forms.milestones;
                form.name = name;
                form.date = date;
                form.exit_criteria = criteria;
                let added = self.forms.milestones.add_milestone(self.wizard).await;
                self.report_added(added).await?
            }
            (WizardStep::ArtifactsAndReview, 1) => {
                if !self.edit_artifacts().await? {
                    return Ok(Flow::Quit);
                }
                self.forms.artifacts.save_artifacts(self.wizard).await
            }
            (WizardStep::ArtifactsAndReview, _) => self.forms.artifacts.commit(self.wizard).await,
        };

        if let Err(e) = outcome {
            debug!(error = %e, "Wizard action did not complete");
        }
        Ok(Flow::Continue)
    }

    async fn report_added(
        &mut self,
        result: Result<bool, WizardError>,
    ) -> std::io::Result<Result<(), WizardError>> {
        match result {
            Ok(true) => Ok(Ok(())),
            Ok(false) => {
                self.term.write("Nothing added: name is blank.\n").await?;
                Ok(Ok(()))
            }
            Err(e) => Ok(Err(e)),
        }
    }

    // ── Field editors ───────────────────────────────────────────────
    //
    // Each returns `false` on end of input.

    async fn edit_basics(&mut self) -> std::io::Result<bool> {
        let form = &self.forms.basics;
        let (name, one_line, problem) = (
            form.name.clone(),
            form.one_line.clone(),
            form.problem_statement.clone(),
        );
        let Some(name) = self.term.prompt_keep("Project name*", &name).await? else {
            return Ok(false);
        };
        let Some(one_line) = self.term.prompt_keep("One-line description", &one_line).await? else {
            return Ok(false);
        };
        let Some(problem) = self.term.prompt_keep("Problem statement*", &problem).await? else {
            return Ok(false);
        };
        self.forms.basics.name = name;
        self.forms.basics.one_line = one_line;
        self.forms.basics.problem_statement = problem;
        Ok(true)
    }

    async fn edit_direction(&mut self) -> std::io::Result<bool> {
        let current = self.forms.direction.clone();
        let Some(north_star) = self
            .term
            .prompt_keep("North star metric", &current.north_star)
            .await?
        else {
            return Ok(false);
        };
        let Some(objectives) = self
            .term
            .prompt_keep(
                "Business objectives (comma-separated)",
                &current.business_objectives,
            )
            .await?
        else {
            return Ok(false);
        };
        let Some(out_of_scope) = self
            .term
            .prompt_lines("Out of scope", &current.out_of_scope)
            .await?
        else {
            return Ok(false);
        };
        let form = &mut self.forms.direction;
        form.north_star = north_star;
        form.business_objectives = objectives;
        form.out_of_scope = out_of_scope;
        Ok(true)
    }

    async fn edit_objective(&mut self) -> std::io::Result<bool> {
        let labels = [
            "Objective name",
            "Definition",
            "Unit",
            "Baseline",
            "Target",
            "Target date (YYYY-MM-DD)",
        ];
        let mut answers = Vec::with_capacity(labels.len());
        for label in labels {
            let Some(answer) = self.term.prompt(label).await? else {
                return Ok(false);
            };
            answers.push(answer);
        }
        let mut answers = answers.into_iter();
        let o = &mut self.forms.metrics.objective;
        o.name = answers.next().unwrap_or_default();
        o.definition = answers.next().unwrap_or_default();
        o.unit = answers.next().unwrap_or_default();
        o.baseline = answers.next().unwrap_or_default();
        o.target = answers.next().unwrap_or_default();
        o.target_date = answers.next().unwrap_or_default();
        Ok(true)
    }

    async fn edit_guardrail(&mut self) -> std::io::Result<bool> {
        let labels = ["Guardrail name", "Definition", "Unit", "Threshold"];
        let mut answers = Vec::with_capacity(labels.len());
        for label in labels {
            let Some(answer) = self.term.prompt(label).await? else {
                return Ok(false);
            };
            answers.push(answer);
        }
        let Some(direction) = self.term.prompt_keep("Direction (min|max)", "min").await? else {
            return Ok(false);
        };
        let direction = match direction.parse::<Direction>() {
            Ok(d) => d,
            Err(e) => {
                self.term.write(&format!("{e}; using min\n")).await?;
                Direction::Min
            }
        };

        let mut answers = answers.into_iter();
        let g = &mut self.forms.metrics.guardrail;
        g.name = answers.next().unwrap_or_default();
        g.definition = answers.next().unwrap_or_default();
        g.unit = answers.next().unwrap_or_default();
        g.threshold = answers.next().unwrap_or_default();
        g.direction = direction;
        Ok(true)
    }

    async fn edit_artifacts(&mut self) -> std::io::Result<bool> {
        let current = self.forms.artifacts.clone();
        let Some(prds) = self.term.prompt_lines("PRD links", &current.prds).await? else {
            return Ok(false);
        };
        let Some(designs) = self.term.prompt_lines("Design links", &current.designs).await? else {
            return Ok(false);
        };
        let Some(tech_docs) = self
            .term
            .prompt_lines("Tech doc links", &current.tech_docs)
            .await?
        else {
            return Ok(false);
        };
        let kind_label = current
            .schema_kind
            .map(|k| k.to_string())
            .unwrap_or_else(|| "none".to_string());
        let Some(kind) = self
            .term
            .prompt_keep("Data schema type (none|link|inline)", &kind_label)
            .await?
        else {
            return Ok(false);
        };
        let schema_kind = match parse_schema_kind(&kind) {
            Ok(kind) => kind,
            Err(e) => {
                self.term.write(&format!("{e}; keeping {kind_label}\n")).await?;
                current.schema_kind
            }
        };
        let schema_value = if schema_kind.is_some() {
            let Some(value) = self
                .term
                .prompt_keep("Schema URL or DDL", &current.schema_value)
                .await?
            else {
                return Ok(false);
            };
            value
        } else {
            String::new()
        };

        self.forms.artifacts = ArtifactsForm {
            prds,
            designs,
            tech_docs,
            schema_kind,
            schema_value,
        };
        Ok(true)
    }
}

fn actions(step: WizardStep) -> &'static [&'static str] {
    match step {
        WizardStep::Basics => &["save draft", "save & continue"],
        WizardStep::Direction => &["edit & continue"],
        WizardStep::UsersAndUseCases => &["add persona", "add use case"],
        WizardStep::Metrics => &["add primary objective", "add guardrail"],
        WizardStep::Milestones => &["add milestone"],
        WizardStep::ArtifactsAndReview => &["save artifacts", "commit onboarding"],
    }
}
