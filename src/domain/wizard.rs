//! Room/service/review wizard state machine
//!
//! Each [`Step`] maps to a [`StepHandler`] holding a render function and a
//! submit function. The handlers are plain functions over explicit state, so a
//! single [`WizardForm`] can serve any number of sessions concurrently.

use tracing::debug;

use super::{
    Action, ActionButton, Confirmation, FieldDefinition, FieldError, FieldKind, FieldMap,
    FieldValue, RawInput, Step, StepForm, SummaryRow, WizardError, WizardResult, WizardSession,
};

/// Identifies the wizard form in posted submissions.
pub const FORM_ID: &str = "multistep_singleurl";

pub const ROOM_RATING: &str = "room_rating";
pub const SERVICE_RATING: &str = "service_rating";
pub const EMAIL: &str = "email";

const RATING_OPTIONS: [u8; 5] = [1, 2, 3, 4, 5];
const ROOM_RATING_LABEL: &str = "How would you rate the room you stayed in?";
const SERVICE_RATING_LABEL: &str = "How would you rate our service?";
const EMAIL_LABEL: &str = "Email Address";
const EMAIL_DESCRIPTION: &str =
    "Enter your email address and you'll be entered into a prize draw";
const ILLEGAL_CHOICE: &str =
    "An illegal choice has been detected. Please contact the site administrator.";
const CONFIRMATION_MESSAGE: &str = "Thank you for your submission";

/// Fields and summary rows produced by a step's render function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepContent {
    pub fields: Vec<FieldDefinition>,
    pub summary: Vec<SummaryRow>,
}

pub type RenderFn = fn(&FieldMap) -> StepContent;
pub type SubmitFn = fn(&RawInput) -> Result<FieldMap, Vec<FieldError>>;
pub type CompleteFn = fn(&WizardSession) -> Confirmation;

#[derive(Clone, Copy)]
pub struct StepHandler {
    pub render: RenderFn,
    pub submit: SubmitFn,
    /// Runs instead of a forward transition; only the final step has one
    pub on_complete: Option<CompleteFn>,
}

/// Explicit step → handler mapping, indexed by step position.
#[derive(Clone, Default)]
pub struct StepTable {
    handlers: [Option<StepHandler>; Step::COUNT],
}

impl StepTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Room, service and review handlers.
    pub fn standard() -> Self {
        Self::empty()
            .with_handler(
                Step::Room,
                StepHandler {
                    render: render_room,
                    submit: submit_room,
                    on_complete: None,
                },
            )
            .with_handler(
                Step::Service,
                StepHandler {
                    render: render_service,
                    submit: submit_service,
                    on_complete: None,
                },
            )
            .with_handler(
                Step::Review,
                StepHandler {
                    render: render_review,
                    submit: submit_review,
                    on_complete: Some(complete_review),
                },
            )
    }

    pub fn with_handler(mut self, step: Step, handler: StepHandler) -> Self {
        self.handlers[step.position() - 1] = Some(handler);
        self
    }

    pub fn without(mut self, step: Step) -> Self {
        self.handlers[step.position() - 1] = None;
        self
    }

    pub fn get(&self, step: Step) -> WizardResult<&StepHandler> {
        self.handlers[step.position() - 1]
            .as_ref()
            .ok_or(WizardError::MissingHandler(step))
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The session moved to another step and that step should be shown
    Transitioned {
        session: WizardSession,
        from: Step,
        to: Step,
    },
    /// The final step was submitted; no further step follows
    Completed {
        session: WizardSession,
        confirmation: Confirmation,
    },
}

impl SubmitOutcome {
    pub fn session(&self) -> &WizardSession {
        match self {
            Self::Transitioned { session, .. } | Self::Completed { session, .. } => session,
        }
    }
}

/// The wizard form handler.
#[derive(Clone)]
pub struct WizardForm {
    table: StepTable,
}

impl WizardForm {
    pub fn new(table: StepTable) -> Self {
        Self { table }
    }

    pub fn form_id(&self) -> &'static str {
        FORM_ID
    }

    /// Steps without a registered handler.
    pub fn missing_steps(&self) -> Vec<Step> {
        Step::ALL
            .into_iter()
            .filter(|step| self.table.get(*step).is_err())
            .collect()
    }

    /// Actions a step exposes, in document order; the initial step has no "Back".
    ///
    /// "Next" always comes first: browsers submit the first button when the
    /// visitor presses Enter in a field.
    pub fn actions_for(step: Step) -> Vec<Action> {
        if step.is_initial() {
            vec![Action::Next]
        } else {
            vec![Action::Next, Action::Back]
        }
    }

    /// Build the form for the session's current step, pre-filled from its values.
    pub fn render(&self, session: &WizardSession) -> WizardResult<StepForm> {
        let step = session.current_step;
        let handler = self.table.get(step)?;
        let content = (handler.render)(&session.values);

        Ok(StepForm {
            form_id: FORM_ID.to_string(),
            step,
            position: step.position(),
            total: Step::COUNT,
            fields: content.fields,
            actions: Self::actions_for(step)
                .into_iter()
                .map(ActionButton::from)
                .collect(),
            summary: content.summary,
        })
    }

    /// Apply a submission to the session and compute the next state.
    ///
    /// The input session is left untouched; the new state is returned in the
    /// outcome. Validation failures leave the step unchanged.
    pub fn submit(
        &self,
        session: &WizardSession,
        action: Action,
        input: &RawInput,
    ) -> WizardResult<SubmitOutcome> {
        if session.complete {
            return Err(WizardError::AlreadyComplete);
        }

        let from = session.current_step;
        let handler = self.table.get(from)?;

        if !Self::actions_for(from).contains(&action) {
            return Err(WizardError::ActionUnavailable { step: from, action });
        }

        match action {
            Action::Back => {
                let to = self.resolve(from.position() - 1)?;
                debug!(from = %from, to = %to, "Moving back");
                Ok(SubmitOutcome::Transitioned {
                    session: session.clone().at(to),
                    from,
                    to,
                })
            }
            Action::Next => {
                let submitted = (handler.submit)(input).map_err(|errors| {
                    WizardError::Validation { step: from, errors }
                })?;
                let mut next = session.clone().merged(submitted);

                if let Some(complete) = handler.on_complete {
                    next.complete = true;
                    let confirmation = complete(&next);
                    debug!(step = %from, "Wizard completed");
                    return Ok(SubmitOutcome::Completed {
                        session: next,
                        confirmation,
                    });
                }

                let to = self.resolve(from.position() + 1)?;
                debug!(from = %from, to = %to, "Moving forward");
                Ok(SubmitOutcome::Transitioned {
                    session: next.at(to),
                    from,
                    to,
                })
            }
        }
    }

    /// Map a computed position to a step that has a registered handler.
    fn resolve(&self, position: usize) -> WizardResult<Step> {
        let step = Step::from_position(position).ok_or(WizardError::StepOutOfRange(position))?;
        self.table.get(step)?;
        Ok(step)
    }
}

impl Default for WizardForm {
    fn default() -> Self {
        Self::new(StepTable::standard())
    }
}

fn rating_field(name: &str, label: &str, values: &FieldMap) -> FieldDefinition {
    FieldDefinition {
        name: name.to_string(),
        label: label.to_string(),
        description: None,
        kind: FieldKind::Radios {
            options: RATING_OPTIONS.to_vec(),
        },
        required: true,
        default_value: stored(values, name),
    }
}

/// Previously stored value, treating an empty string as unset.
fn stored(values: &FieldMap, name: &str) -> Option<String> {
    values
        .get(name)
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty())
}

fn render_room(values: &FieldMap) -> StepContent {
    StepContent {
        fields: vec![rating_field(ROOM_RATING, ROOM_RATING_LABEL, values)],
        summary: Vec::new(),
    }
}

fn render_service(values: &FieldMap) -> StepContent {
    StepContent {
        fields: vec![rating_field(SERVICE_RATING, SERVICE_RATING_LABEL, values)],
        summary: Vec::new(),
    }
}

fn render_review(values: &FieldMap) -> StepContent {
    let row = |label: &str, name: &str| SummaryRow {
        label: label.to_string(),
        value: stored(values, name).unwrap_or_default(),
    };

    StepContent {
        fields: vec![FieldDefinition {
            name: EMAIL.to_string(),
            label: EMAIL_LABEL.to_string(),
            description: Some(EMAIL_DESCRIPTION.to_string()),
            kind: FieldKind::Email,
            required: false,
            default_value: stored(values, EMAIL),
        }],
        summary: vec![
            row("Room Rating", ROOM_RATING),
            row("Service Rating", SERVICE_RATING),
        ],
    }
}

/// Validate a required 1-5 choice.
fn parse_rating(input: &RawInput, name: &str, label: &str) -> Result<FieldMap, Vec<FieldError>> {
    let raw = input.get(name).map(|v| v.trim()).unwrap_or_default();
    if raw.is_empty() {
        return Err(vec![FieldError::new(
            name,
            format!("{} field is required.", label),
        )]);
    }

    match raw.parse::<u8>() {
        Ok(rating) if RATING_OPTIONS.contains(&rating) => {
            Ok(FieldMap::from([(name.to_string(), FieldValue::Rating(rating))]))
        }
        _ => Err(vec![FieldError::new(name, ILLEGAL_CHOICE)]),
    }
}

fn submit_room(input: &RawInput) -> Result<FieldMap, Vec<FieldError>> {
    parse_rating(input, ROOM_RATING, ROOM_RATING_LABEL)
}

fn submit_service(input: &RawInput) -> Result<FieldMap, Vec<FieldError>> {
    parse_rating(input, SERVICE_RATING, SERVICE_RATING_LABEL)
}

fn submit_review(input: &RawInput) -> Result<FieldMap, Vec<FieldError>> {
    let email = input.get(EMAIL).map(|v| v.trim()).unwrap_or_default();
    if !email.is_empty() && !is_valid_email(email) {
        return Err(vec![FieldError::new(
            EMAIL,
            format!("The email address {} is not valid.", email),
        )]);
    }
    Ok(FieldMap::from([(
        EMAIL.to_string(),
        FieldValue::Text(email.to_string()),
    )]))
}

fn complete_review(_session: &WizardSession) -> Confirmation {
    Confirmation {
        message: CONFIRMATION_MESSAGE.to_string(),
    }
}

/// Structural check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pairs: &[(&str, &str)]) -> RawInput {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn transitioned(outcome: SubmitOutcome) -> WizardSession {
        match outcome {
            SubmitOutcome::Transitioned { session, .. } => session,
            other => panic!("expected a transition, got {:?}", other),
        }
    }

    #[test]
    fn test_every_rating_advances_room_to_service() {
        let wizard = WizardForm::default();
        for rating in 1..=5u8 {
            let value = rating.to_string();
            let outcome = wizard
                .submit(
                    &WizardSession::new(),
                    Action::Next,
                    &input(&[(ROOM_RATING, &value)]),
                )
                .unwrap();
            let session = transitioned(outcome);
            assert_eq!(session.current_step, Step::Service);
            assert_eq!(session.value(ROOM_RATING), Some(&FieldValue::Rating(rating)));
            assert!(!session.complete);
        }
    }

    #[test]
    fn test_missing_room_rating_is_a_validation_error() {
        let wizard = WizardForm::default();
        let session = WizardSession::new();

        let err = wizard
            .submit(&session, Action::Next, &input(&[]))
            .unwrap_err();

        assert!(!err.is_fatal());
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].field, ROOM_RATING);
        assert!(err.field_errors()[0].message.ends_with("field is required."));
        assert_eq!(session.current_step, Step::Room);
    }

    #[test]
    fn test_out_of_range_rating_is_an_illegal_choice() {
        let wizard = WizardForm::default();
        for bad in ["0", "6", "three", "-1"] {
            let err = wizard
                .submit(&WizardSession::new(), Action::Next, &input(&[(ROOM_RATING, bad)]))
                .unwrap_err();
            assert_eq!(err.field_errors()[0].message, ILLEGAL_CHOICE);
        }
    }

    #[test]
    fn test_back_from_service_preserves_values() {
        let wizard = WizardForm::default();
        let session = WizardSession::new()
            .merged(FieldMap::from([(ROOM_RATING.to_string(), FieldValue::Rating(3))]))
            .at(Step::Service);

        let back = transitioned(
            wizard
                .submit(&session, Action::Back, &input(&[(SERVICE_RATING, "5")]))
                .unwrap(),
        );

        assert_eq!(back.current_step, Step::Room);
        assert_eq!(back.values, session.values);
        assert_eq!(back.value(SERVICE_RATING), None);
    }

    #[test]
    fn test_back_skips_validation() {
        let wizard = WizardForm::default();
        let session = WizardSession::new().at(Step::Review);

        let back = transitioned(
            wizard
                .submit(&session, Action::Back, &input(&[(EMAIL, "not an email")]))
                .unwrap(),
        );
        assert_eq!(back.current_step, Step::Service);
    }

    #[test]
    fn test_back_on_initial_step_is_rejected() {
        let wizard = WizardForm::default();
        let err = wizard
            .submit(&WizardSession::new(), Action::Back, &input(&[]))
            .unwrap_err();

        assert_eq!(
            err,
            WizardError::ActionUnavailable {
                step: Step::Room,
                action: Action::Back
            }
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_round_trip_prefills_room_rating() {
        let wizard = WizardForm::default();
        let session = transitioned(
            wizard
                .submit(&WizardSession::new(), Action::Next, &input(&[(ROOM_RATING, "2")]))
                .unwrap(),
        );
        let session = transitioned(wizard.submit(&session, Action::Back, &input(&[])).unwrap());

        let form = wizard.render(&session).unwrap();
        assert_eq!(form.step, Step::Room);
        assert_eq!(
            form.field(ROOM_RATING).and_then(|f| f.default_value.clone()),
            Some("2".to_string())
        );

        let session = transitioned(
            wizard
                .submit(&session, Action::Next, &input(&[(ROOM_RATING, "2")]))
                .unwrap(),
        );
        assert_eq!(session.current_step, Step::Service);
    }

    #[test]
    fn test_full_scenario_completes() {
        let wizard = WizardForm::default();

        let session = transitioned(
            wizard
                .submit(&WizardSession::new(), Action::Next, &input(&[(ROOM_RATING, "4")]))
                .unwrap(),
        );
        assert_eq!(session.current_step, Step::Service);
        assert_eq!(
            session.values,
            FieldMap::from([(ROOM_RATING.to_string(), FieldValue::Rating(4))])
        );

        let session = transitioned(
            wizard
                .submit(&session, Action::Next, &input(&[(SERVICE_RATING, "2")]))
                .unwrap(),
        );
        assert_eq!(session.current_step, Step::Review);
        assert_eq!(session.value(ROOM_RATING), Some(&FieldValue::Rating(4)));
        assert_eq!(session.value(SERVICE_RATING), Some(&FieldValue::Rating(2)));

        match wizard
            .submit(&session, Action::Next, &input(&[(EMAIL, "a@b.com")]))
            .unwrap()
        {
            SubmitOutcome::Completed {
                session,
                confirmation,
            } => {
                assert!(session.complete);
                assert_eq!(session.current_step, Step::Review);
                assert_eq!(
                    session.value(EMAIL),
                    Some(&FieldValue::Text("a@b.com".to_string()))
                );
                assert_eq!(confirmation.message, CONFIRMATION_MESSAGE);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_completed_session_accepts_no_further_submissions() {
        let wizard = WizardForm::default();
        let mut session = WizardSession::new().at(Step::Review);
        session.complete = true;

        let err = wizard
            .submit(&session, Action::Next, &input(&[(EMAIL, "a@b.com")]))
            .unwrap_err();
        assert_eq!(err, WizardError::AlreadyComplete);
    }

    #[test]
    fn test_email_is_optional_but_must_be_well_formed() {
        let wizard = WizardForm::default();
        let session = WizardSession::new().at(Step::Review);

        let outcome = wizard.submit(&session, Action::Next, &input(&[])).unwrap();
        assert!(outcome.session().complete);

        let err = wizard
            .submit(&session, Action::Next, &input(&[(EMAIL, "nobody")]))
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, EMAIL);
    }

    #[test]
    fn test_render_actions_per_step() {
        let wizard = WizardForm::default();
        let room = wizard.render(&WizardSession::new()).unwrap();
        assert!(room.has_action(Action::Next));
        assert!(!room.has_action(Action::Back));

        for step in [Step::Service, Step::Review] {
            let form = wizard.render(&WizardSession::new().at(step)).unwrap();
            assert!(form.has_action(Action::Back));
            assert_eq!(form.actions[0].id, Action::Next.id());
            assert_eq!(form.position, step.position());
            assert_eq!(form.total, 3);
        }
    }

    #[test]
    fn test_review_renders_summary() {
        let wizard = WizardForm::default();
        let session = WizardSession::new()
            .merged(FieldMap::from([
                (ROOM_RATING.to_string(), FieldValue::Rating(4)),
                (SERVICE_RATING.to_string(), FieldValue::Rating(2)),
            ]))
            .at(Step::Review);

        let form = wizard.render(&session).unwrap();
        assert_eq!(form.summary[0].value, "4");
        assert_eq!(form.summary[1].value, "2");
        let email = form.field(EMAIL).unwrap();
        assert!(!email.required);
        assert_eq!(email.kind, FieldKind::Email);
    }

    #[test]
    fn test_missing_handler_is_fatal_on_render() {
        let wizard = WizardForm::new(StepTable::standard().without(Step::Service));
        let err = wizard
            .render(&WizardSession::new().at(Step::Service))
            .unwrap_err();
        assert_eq!(err, WizardError::MissingHandler(Step::Service));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_transition_into_unmapped_step_is_fatal() {
        let wizard = WizardForm::new(StepTable::standard().without(Step::Service));
        let err = wizard
            .submit(&WizardSession::new(), Action::Next, &input(&[(ROOM_RATING, "1")]))
            .unwrap_err();
        assert_eq!(err, WizardError::MissingHandler(Step::Service));
    }

    #[test]
    fn test_last_step_without_completion_hook_cannot_advance() {
        let review = StepHandler {
            render: render_review,
            submit: submit_review,
            on_complete: None,
        };
        let wizard = WizardForm::new(StepTable::standard().with_handler(Step::Review, review));

        let err = wizard
            .submit(&WizardSession::new().at(Step::Review), Action::Next, &input(&[]))
            .unwrap_err();
        assert_eq!(err, WizardError::StepOutOfRange(4));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_steps() {
        assert!(WizardForm::default().missing_steps().is_empty());
        let broken = WizardForm::new(StepTable::empty().with_handler(
            Step::Room,
            StepHandler {
                render: render_room,
                submit: submit_room,
                on_complete: None,
            },
        ));
        assert_eq!(broken.missing_steps(), vec![Step::Service, Step::Review]);
    }

    #[test]
    fn test_rejected_input_is_shown_again() {
        let wizard = WizardForm::default();
        let session = WizardSession::new()
            .merged(FieldMap::from([(EMAIL.to_string(), FieldValue::Text("old@b.com".to_string()))]))
            .at(Step::Review);

        let form = wizard
            .render(&session)
            .unwrap()
            .with_submitted(&input(&[(EMAIL, " nobody ")]));
        assert_eq!(
            form.field(EMAIL).and_then(|f| f.default_value.clone()),
            Some("nobody".to_string())
        );
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b..com"));
    }
}
