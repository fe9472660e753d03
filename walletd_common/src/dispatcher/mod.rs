mod backoff;
mod generator;

use std::{
    convert::Infallible,
    fmt::{self, Display, Formatter},
    thread,
    time::Duration
};
use log::{debug, error, info, warn};
use serde_json::{json, Value};

use crate::json_rpc::{parse_response, JsonRPCClient, JsonRPCError};

pub use backoff::{Backoff, DEFAULT_BASE_DELAY};
pub use generator::{
    RequestGenerator,
    ChangeGenerator,
    Phase,
    INITIAL_MAGNITUDE,
    MAGNITUDE_FACTOR,
    MAGNITUDE_CEILING,
    AMOUNT_SPREAD
};

/// A method and its parameters, built fresh for every attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: String,
    pub params: Value,
}

impl RequestSpec {
    pub fn new<S: Into<String>>(method: S, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug)]
pub enum FailureReason {
    // walletd could not be reached
    Transport(JsonRPCError),
    // the response envelope contains an error
    Protocol(Value),
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Doesn't seem like walletd is running: {}", e),
            Self::Protocol(error) => write!(f, "{}", error),
        }
    }
}

impl FailureReason {
    // Map the error object to its JSON-RPC error kind
    pub fn into_error(self) -> JsonRPCError {
        match self {
            Self::Transport(e) => e,
            Self::Protocol(error) => match parse_response::<Value>(json!({ "error": error })) {
                Err(e) => e,
                Ok(_) => JsonRPCError::MissingResult,
            },
        }
    }
}

#[derive(Debug)]
pub enum ResponseOutcome {
    Success(Value),
    Failure(FailureReason),
}

impl ResponseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

// The presence of an error key is the only thing deciding a failure,
// even if a result is present too
pub fn classify(mut response: Value) -> ResponseOutcome {
    if !response.is_object() {
        return ResponseOutcome::Failure(FailureReason::Transport(JsonRPCError::InvalidResponse))
    }

    if let Some(error) = response.get_mut("error") {
        return ResponseOutcome::Failure(FailureReason::Protocol(error.take()))
    }

    let result = response.get_mut("result")
        .map(Value::take)
        .unwrap_or(Value::Null);

    ResponseOutcome::Success(result)
}

/// Remote collaborator the dispatcher sends its requests to.
pub trait Endpoint {
    fn attempt(&self, request: &RequestSpec) -> ResponseOutcome;
}

impl Endpoint for JsonRPCClient {
    fn attempt(&self, request: &RequestSpec) -> ResponseOutcome {
        match self.call_raw(&request.method, &request.params) {
            Ok(response) => classify(response),
            Err(e) => ResponseOutcome::Failure(FailureReason::Transport(e)),
        }
    }
}

pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

// Blocks the calling thread for the whole delay
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}

#[derive(Debug)]
pub struct StepReport {
    pub request: RequestSpec,
    pub outcome: ResponseOutcome,
    // delay slept before returning, only on failure
    pub slept: Option<Duration>,
}

/// Sends requests one after the other forever.
///
/// A success resets the backoff delay. A failure sleeps for the current
/// delay, doubles it and restarts the generator sequence.
pub struct Dispatcher<E: Endpoint, S: Sleeper = ThreadSleeper> {
    endpoint: E,
    sleeper: S,
    backoff: Backoff,
}

impl<E: Endpoint> Dispatcher<E, ThreadSleeper> {
    pub fn new(endpoint: E, backoff: Backoff) -> Self {
        Self::with_sleeper(endpoint, ThreadSleeper, backoff)
    }
}

impl<E: Endpoint, S: Sleeper> Dispatcher<E, S> {
    pub fn with_sleeper(endpoint: E, sleeper: S, backoff: Backoff) -> Self {
        Self {
            endpoint,
            sleeper,
            backoff,
        }
    }

    pub fn get_backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn get_sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn attempt(&self, request: &RequestSpec) -> ResponseOutcome {
        self.endpoint.attempt(request)
    }

    pub fn step<G: RequestGenerator>(&mut self, generator: &mut G) -> StepReport {
        let request = generator.next_request();
        debug!("Attempting {} with {}", request.method, request.params);

        let outcome = self.attempt(&request);
        let slept = match &outcome {
            ResponseOutcome::Success(result) => {
                info!("{}", result);
                self.backoff.reset();
                None
            },
            ResponseOutcome::Failure(reason) => {
                error!("{}", reason);
                let delay = self.backoff.current();
                self.sleeper.sleep(delay);
                warn!("Slept for {} seconds...", delay.as_secs_f64());
                self.backoff.grow();
                generator.restart();
                Some(delay)
            }
        };

        StepReport {
            request,
            outcome,
            slept,
        }
    }

    // Only stops when the process is killed
    pub fn run<G: RequestGenerator>(&mut self, generator: &mut G) -> Infallible {
        match self.backoff.max() {
            Some(max) => info!("Starting dispatcher, base delay is {:?}, max delay is {:?}", self.backoff.base(), max),
            None => info!("Starting dispatcher, base delay is {:?}, no max delay", self.backoff.base()),
        }
        loop {
            self.step(generator);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, collections::VecDeque};
    use rand::{rngs::StdRng, SeedableRng};

    // Replays a fixed list of response envelopes, None meaning unreachable
    struct ScriptedEndpoint {
        responses: RefCell<VecDeque<Option<Value>>>,
        requests: RefCell<Vec<RequestSpec>>,
    }

    impl ScriptedEndpoint {
        fn new(responses: Vec<Option<Value>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Endpoint for ScriptedEndpoint {
        fn attempt(&self, request: &RequestSpec) -> ResponseOutcome {
            self.requests.borrow_mut().push(request.clone());
            match self.responses.borrow_mut().pop_front().flatten() {
                Some(response) => classify(response),
                None => ResponseOutcome::Failure(FailureReason::Transport(JsonRPCError::InvalidResponse)),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        delays: Vec<Duration>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&mut self, delay: Duration) {
            self.delays.push(delay);
        }
    }

    fn error() -> Option<Value> {
        Some(json!({"error": {"code": -32000, "message": "Not enough money"}}))
    }

    fn success() -> Option<Value> {
        Some(json!({"result": {"transactionHash": "abcd"}}))
    }

    fn generator() -> ChangeGenerator<StdRng> {
        ChangeGenerator::new("own".to_owned(), 10, 5, StdRng::seed_from_u64(0))
    }

    fn amount_of(request: &RequestSpec) -> u64 {
        request.params["transfers"][0]["amount"].as_u64().unwrap()
    }

    #[test]
    fn test_client_attempt_on_closed_port() {
        let client = JsonRPCClient::new(&crate::config::unreachable_rpc_config()).unwrap();
        let outcome = client.attempt(&RequestSpec::new("sendTransaction", json!({})));
        assert!(matches!(outcome, ResponseOutcome::Failure(FailureReason::Transport(_))));
    }

    #[test]
    fn test_protocol_failure_into_error() {
        let reason = FailureReason::Protocol(json!({"code": -32601, "message": "Method not found"}));
        assert!(matches!(reason.into_error(), JsonRPCError::MethodNotFound));

        let reason = FailureReason::Protocol(json!({"code": 7, "message": "Wrong amount"}));
        match reason.into_error() {
            JsonRPCError::ServerError { code, message, .. } => {
                assert_eq!(code, 7);
                assert_eq!(message, "Wrong amount");
            },
            e => panic!("unexpected error: {}", e),
        }

        // not a JSON-RPC error object
        let reason = FailureReason::Protocol(Value::Null);
        assert!(matches!(reason.into_error(), JsonRPCError::SerializationError(_)));
    }

    #[test]
    fn test_classify_error_wins_over_result() {
        let outcome = classify(json!({"error": {"code": 1}, "result": {"transactionHash": "abcd"}}));
        assert!(matches!(outcome, ResponseOutcome::Failure(FailureReason::Protocol(_))));
    }

    #[test]
    fn test_classify_null_error_is_a_failure() {
        let outcome = classify(json!({"error": null}));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_classify_success_returns_result() {
        match classify(json!({"id": "test", "result": {"transactionHash": "abcd"}})) {
            ResponseOutcome::Success(result) => assert_eq!(result, json!({"transactionHash": "abcd"})),
            ResponseOutcome::Failure(reason) => panic!("unexpected failure: {}", reason),
        }

        match classify(json!({"id": "test"})) {
            ResponseOutcome::Success(result) => assert!(result.is_null()),
            ResponseOutcome::Failure(reason) => panic!("unexpected failure: {}", reason),
        }
    }

    #[test]
    fn test_three_failures_then_success() {
        let endpoint = ScriptedEndpoint::new(vec![error(), None, error(), success()]);
        let backoff = Backoff::new(Duration::from_millis(1), None).unwrap();
        let mut dispatcher = Dispatcher::with_sleeper(endpoint, RecordingSleeper::default(), backoff);
        let mut generator = generator();

        for _ in 0..3 {
            let report = dispatcher.step(&mut generator);
            assert!(!report.outcome.is_success());
        }
        assert_eq!(dispatcher.get_backoff().current(), Duration::from_millis(8));

        let report = dispatcher.step(&mut generator);
        assert!(report.outcome.is_success());
        assert!(report.slept.is_none());

        assert_eq!(dispatcher.get_sleeper().delays, vec![
            Duration::from_millis(1),
            Duration::from_millis(2),
            Duration::from_millis(4)
        ]);
        assert_eq!(dispatcher.get_backoff().current(), Duration::from_millis(1));
    }

    #[test]
    fn test_failure_restarts_escalation() {
        let endpoint = ScriptedEndpoint::new(vec![success(), success(), error(), success()]);
        let mut dispatcher = Dispatcher::with_sleeper(endpoint, RecordingSleeper::default(), Backoff::default());
        let mut generator = generator();

        let amounts: Vec<u64> = (0..4)
            .map(|_| amount_of(&dispatcher.step(&mut generator).request))
            .collect();

        assert!(amounts[0] < 11_000);
        assert!(amounts[1] >= 10_000 && amounts[1] < 20_000);
        assert!(amounts[2] >= 100_000 && amounts[2] < 110_000);
        // the failed third request brings the next one back to the first magnitude
        assert!(amounts[3] < 11_000);
    }

    #[test]
    fn test_success_does_not_sleep() {
        let endpoint = ScriptedEndpoint::new(vec![success(); 5]);
        let mut dispatcher = Dispatcher::with_sleeper(endpoint, RecordingSleeper::default(), Backoff::default());
        let mut generator = generator();

        for _ in 0..5 {
            dispatcher.step(&mut generator);
        }
        assert!(dispatcher.get_sleeper().delays.is_empty());
        assert_eq!(dispatcher.get_backoff().current(), DEFAULT_BASE_DELAY);
    }

    #[test]
    fn test_requests_are_forwarded_unchanged() {
        let endpoint = ScriptedEndpoint::new(vec![success()]);
        let mut dispatcher = Dispatcher::with_sleeper(endpoint, RecordingSleeper::default(), Backoff::default());
        let mut generator = generator();

        let report = dispatcher.step(&mut generator);
        let sent = dispatcher.endpoint.requests.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], report.request);
    }
}
