// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod store;
