//! gRPC server lifecycle management.

use std::net::SocketAddr;

use calendar_core::CancelToken;
use calendar_core::config::GrpcConfig;
use tokio::net::{TcpListener, TcpStream};
use tonic::transport::Server;
use tracing::info;

use crate::error::GrpcServerError;
use crate::logging::GrpcLogLayer;
use crate::pb::event_service_server::EventServiceServer;
use crate::service::CalendarGrpcService;

/// A bound, not yet serving, gRPC server.
pub struct GrpcServer {
    listener: TcpListener,
    service: CalendarGrpcService,
}

impl GrpcServer {
    /// Bind `config.host:config.port`.
    ///
    /// # Errors
    ///
    /// Returns [`GrpcServerError::Bind`] if the address cannot be bound.
    pub async fn bind(
        config: &GrpcConfig,
        service: CalendarGrpcService,
    ) -> Result<Self, GrpcServerError> {
        let addr = config.address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| GrpcServerError::Bind(format!("bind failed on {addr}: {e}")))?;
        Ok(Self { listener, service })
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, GrpcServerError> {
        self.listener
            .local_addr()
            .map_err(|e| GrpcServerError::Bind(format!("local address unavailable: {e}")))
    }

    /// Serve until `shutdown` is cancelled, then let in-flight calls finish.
    ///
    /// # Errors
    ///
    /// Returns [`GrpcServerError::Transport`] if the transport fails.
    pub async fn serve(self, shutdown: CancelToken) -> Result<(), GrpcServerError> {
        let addr = self.local_addr()?;
        info!(%addr, "gRPC server listening");

        let incoming = Box::pin(futures::stream::unfold(self.listener, accept));

        Server::builder()
            .layer(GrpcLogLayer)
            .add_service(EventServiceServer::new(self.service))
            .serve_with_incoming_shutdown(incoming, async move { shutdown.cancelled().await })
            .await?;

        info!(%addr, "gRPC server stopped");
        Ok(())
    }
}

async fn accept(
    listener: TcpListener,
) -> Option<(std::io::Result<TcpStream>, TcpListener)> {
    let accepted = listener.accept().await.map(|(stream, _)| stream);
    Some((accepted, listener))
}
