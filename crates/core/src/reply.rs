use crate::models::TurnOutcome;
use crate::text::title_case;

/// Renders the assistant's Spanish reply for a turn outcome. Kept apart
/// from the pipeline so the outcome stays structured for other frontends.
pub fn compose_reply(outcome: &TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Greeting => {
            "¡Hola! 😊 Soy Rutero 🚌 ¿A dónde querés viajar hoy?".to_string()
        }
        TurnOutcome::Farewell => "¡Gracias por tu consulta! ¡Buen viaje! 🚌".to_string(),
        TurnOutcome::NoExtractableTrip => {
            "🤔 No pude identificar el origen y destino. Probá escribir algo como \
             \"de Córdoba a Carlos Paz\"."
                .to_string()
        }
        TurnOutcome::NoMatchingFare => {
            "¡Uy! 😕 No encuentro ese tramo, ¿podrías revisar si está bien escrito?".to_string()
        }
        TurnOutcome::NeedsConfirmation { candidate } => {
            format!(
                "¿Te referís a {}? Respondeme sí o no.",
                title_case(candidate)
            )
        }
        TurnOutcome::Fares {
            origin,
            destination,
            rows,
        } => {
            let mut reply = format!(
                "Encontré estas opciones para tu viaje de {} a {}:\n",
                title_case(origin),
                title_case(destination)
            );
            for row in rows {
                if row.fare_min == row.fare_max {
                    reply.push_str(&format!(
                        "- {} ({}): ${}\n",
                        row.operator, row.mode, row.fare_min
                    ));
                } else {
                    reply.push_str(&format!(
                        "- {} ({}): ${} a ${}\n",
                        row.operator, row.mode, row.fare_min, row.fare_max
                    ));
                }
            }
            reply.trim_end().to_string()
        }
    }
}
