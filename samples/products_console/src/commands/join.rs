use mediator_pipeline::{async_trait, ErrorKind, Request, RequestHandler};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A command without a response.
pub struct JoinCommand(pub String);
impl Request for JoinCommand {}

pub struct JoinHandler;

#[async_trait]
impl RequestHandler<JoinCommand> for JoinHandler {
    async fn handle(&self, req: JoinCommand, cancel: CancellationToken) -> mediator_pipeline::Result<()> {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ErrorKind::Cancelled.into()),
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
        }

        println!("Join us: {}", req.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediator_pipeline::{DefaultMediator, Mediator};

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_join_reports_cancellation_test() {
        let cancel = CancellationToken::new();
        let res = JoinHandler
            .handle(JoinCommand("abc".to_owned()), cancel.clone())
            .await;
        assert!(res.is_ok());

        cancel.cancel();
        let err = JoinHandler
            .handle(JoinCommand("abc".to_owned()), cancel.clone())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        let mediator = DefaultMediator::builder().add_handler(JoinHandler).build();
        let err = mediator
            .send_with(JoinCommand("abc".to_owned()), cancel)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }
}
