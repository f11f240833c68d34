//! Minimal `Greeter` service, handy for checking that a client can reach the
//! server at all.

use ordermgt_core::proto::{HelloReply, HelloRequest, greeter_server::Greeter};
use tonic::{Request, Response, Status};

#[derive(Debug, Default, Clone, Copy)]
pub struct GreeterService;

#[tonic::async_trait]
impl Greeter for GreeterService {
    #[tracing::instrument(skip_all, fields(name = %req.get_ref().name))]
    async fn say_hello(&self, req: Request<HelloRequest>) -> Result<Response<HelloReply>, Status> {
        let message = format!("Hello {}", req.into_inner().name);
        Ok(Response::new(HelloReply { message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn greets_by_name() {
        let reply = GreeterService
            .say_hello(Request::new(HelloRequest {
                name: "gRPC".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(reply.into_inner().message, "Hello gRPC");
    }
}
