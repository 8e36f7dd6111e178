use mediator_pipeline::{async_trait, Request, RequestHandler};
use tokio_util::sync::CancellationToken;

pub struct PingCommand(pub String);
impl Request<String> for PingCommand {}

pub struct PingHandler;

#[async_trait]
impl RequestHandler<PingCommand, String> for PingHandler {
    async fn handle(&self, req: PingCommand, _: CancellationToken) -> mediator_pipeline::Result<String> {
        println!("Ping: {}", req.0);
        Ok("Pong".to_owned())
    }
}
